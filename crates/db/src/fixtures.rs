use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use rigsmith_core::domain::part::{CoolerKind, Part, PartCategory, PartId, PartSpecs};
use rigsmith_core::domain::view_event::{ViewEvent, ViewEventId};

use crate::connection::DbPool;
use crate::repositories::view_event::encode_timestamp;
use crate::repositories::{PartRepository, RepositoryError, SqlCatalogRepository};

/// Demo browsing history: (view id, slug, session, user, hours before seeding).
const DEMO_VIEWS: &[(&str, &str, &str, Option<&str>, i64)] = &[
    ("view-demo-001", "titan-advanced", "sess-demo-1", None, 30),
    ("view-demo-002", "rtx-5070", "sess-demo-1", None, 29),
    ("view-demo-003", "psu-850-gold", "sess-demo-1", None, 28),
    ("view-demo-004", "titan-advanced", "sess-demo-2", None, 50),
    ("view-demo-005", "rtx-5070", "sess-demo-2", None, 49),
    ("view-demo-006", "mech-keyboard-tkl", "sess-demo-2", None, 48),
    ("view-demo-007", "ryzen-7-9700x", "sess-demo-3", Some("user-demo-1"), 72),
    ("view-demo-008", "b650-aorus", "sess-demo-3", Some("user-demo-1"), 71),
    ("view-demo-009", "ddr5-32gb-6000", "sess-demo-4", Some("user-demo-1"), 20),
    ("view-demo-010", "nvme-2tb", "sess-demo-4", Some("user-demo-1"), 19),
    ("view-demo-011", "titan-advanced", "sess-demo-5", Some("user-demo-2"), 120),
    ("view-demo-012", "frostline-360", "sess-demo-6", Some("user-demo-2"), 100),
];

fn part(
    id: &str,
    slug: &str,
    name: &str,
    category: PartCategory,
    price_cents: i64,
    stock: u32,
    tags: &[&str],
    specs: PartSpecs,
) -> Part {
    Part {
        id: PartId(id.to_string()),
        slug: slug.to_string(),
        name: name.to_string(),
        category,
        price: Decimal::new(price_cents, 2),
        stock,
        active: true,
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        specs,
    }
}

fn sockets(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Small but complete catalog: one valid AM5 build plus alternatives that trip each rule.
pub fn demo_parts() -> Vec<Part> {
    vec![
        part(
            "part-cpu-001",
            "ryzen-7-9700x",
            "Ryzen 7 9700X",
            PartCategory::Cpu,
            35_900,
            12,
            &["cpu", "am5"],
            PartSpecs { socket: Some("AM5".into()), tdp_w: Some(105), ..PartSpecs::default() },
        ),
        part(
            "part-cpu-002",
            "ryzen-9-9950x",
            "Ryzen 9 9950X",
            PartCategory::Cpu,
            64_900,
            3,
            &["cpu", "am5", "upgrade"],
            PartSpecs { socket: Some("AM5".into()), tdp_w: Some(170), ..PartSpecs::default() },
        ),
        part(
            "part-cpu-003",
            "core-i7-14700k",
            "Core i7-14700K",
            PartCategory::Cpu,
            39_900,
            6,
            &["cpu", "lga1700"],
            PartSpecs { socket: Some("LGA1700".into()), tdp_w: Some(253), ..PartSpecs::default() },
        ),
        part(
            "part-mb-001",
            "b650-aorus",
            "B650 Aorus Elite",
            PartCategory::Motherboard,
            21_900,
            8,
            &["motherboard", "am5"],
            PartSpecs {
                socket: Some("AM5".into()),
                chipset: Some("B650".into()),
                ram_gen: Some("DDR5".into()),
                max_memory_speed_mhz: Some(6400),
                pcie_x16_gen: Some(4),
                ..PartSpecs::default()
            },
        ),
        part(
            "part-mb-002",
            "z790-pro",
            "Z790 Pro WiFi",
            PartCategory::Motherboard,
            27_900,
            4,
            &["motherboard", "lga1700"],
            PartSpecs {
                socket: Some("LGA1700".into()),
                chipset: Some("Z790".into()),
                ram_gen: Some("DDR5".into()),
                max_memory_speed_mhz: Some(7200),
                pcie_x16_gen: Some(5),
                ..PartSpecs::default()
            },
        ),
        part(
            "part-ram-001",
            "ddr5-32gb-6000",
            "DDR5 32GB 6000MHz",
            PartCategory::Ram,
            11_900,
            20,
            &["ram", "memory"],
            PartSpecs {
                ram_gen: Some("DDR5".into()),
                memory_speed_mhz: Some(6000),
                capacity_gb: Some(32),
                ..PartSpecs::default()
            },
        ),
        part(
            "part-ram-002",
            "ddr4-16gb-3200",
            "DDR4 16GB 3200MHz",
            PartCategory::Ram,
            4_900,
            15,
            &["ram"],
            PartSpecs {
                ram_gen: Some("DDR4".into()),
                memory_speed_mhz: Some(3200),
                capacity_gb: Some(16),
                ..PartSpecs::default()
            },
        ),
        part(
            "part-gpu-001",
            "titan-advanced",
            "Titan Advanced 24GB",
            PartCategory::Gpu,
            149_900,
            2,
            &["gpu"],
            PartSpecs {
                tdp_w: Some(320),
                gpu_length_mm: Some(320),
                pcie_gen: Some(5),
                ..PartSpecs::default()
            },
        ),
        part(
            "part-gpu-002",
            "rtx-5070",
            "RTX 5070 12GB",
            PartCategory::Gpu,
            54_900,
            5,
            &["gpu", "upgrade"],
            PartSpecs {
                tdp_w: Some(250),
                gpu_length_mm: Some(300),
                pcie_gen: Some(5),
                ..PartSpecs::default()
            },
        ),
        part(
            "part-gpu-003",
            "rx-9070",
            "RX 9070 16GB",
            PartCategory::Gpu,
            59_900,
            0,
            &["gpu"],
            PartSpecs {
                tdp_w: Some(220),
                gpu_length_mm: Some(280),
                pcie_gen: Some(4),
                ..PartSpecs::default()
            },
        ),
        part(
            "part-ssd-001",
            "nvme-2tb",
            "NVMe Gen4 2TB",
            PartCategory::Storage,
            12_900,
            30,
            &["storage", "nvme"],
            PartSpecs { capacity_gb: Some(2000), ..PartSpecs::default() },
        ),
        part(
            "part-psu-001",
            "psu-850-gold",
            "850W 80+ Gold",
            PartCategory::Psu,
            12_900,
            9,
            &["psu"],
            PartSpecs {
                wattage_w: Some(850),
                has_12vhpwr_connector: Some(true),
                ..PartSpecs::default()
            },
        ),
        part(
            "part-psu-002",
            "psu-550-bronze",
            "550W 80+ Bronze",
            PartCategory::Psu,
            5_900,
            11,
            &["psu"],
            PartSpecs {
                wattage_w: Some(550),
                has_12vhpwr_connector: Some(false),
                ..PartSpecs::default()
            },
        ),
        part(
            "part-case-001",
            "airflow-mid",
            "Airflow Mid Tower",
            PartCategory::Case,
            9_900,
            7,
            &["case"],
            PartSpecs {
                max_gpu_length_mm: Some(340),
                supports_360_radiator: Some(true),
                fan_count: Some(3),
                ..PartSpecs::default()
            },
        ),
        part(
            "part-case-002",
            "compact-itx",
            "Compact ITX",
            PartCategory::Case,
            8_900,
            4,
            &["case"],
            PartSpecs {
                max_gpu_length_mm: Some(290),
                supports_360_radiator: Some(false),
                fan_count: Some(1),
                ..PartSpecs::default()
            },
        ),
        part(
            "part-cool-001",
            "frostline-360",
            "Frostline 360 AIO",
            PartCategory::Cooler,
            14_900,
            4,
            &["cooler", "upgrade"],
            PartSpecs {
                cooler_kind: Some(CoolerKind::Liquid),
                radiator_mm: Some(360),
                compatible_sockets: sockets(&["AM5", "LGA1700"]),
                ..PartSpecs::default()
            },
        ),
        part(
            "part-cool-002",
            "tower-air-120",
            "Tower Air 120",
            PartCategory::Cooler,
            3_900,
            25,
            &["cooler"],
            PartSpecs {
                cooler_kind: Some(CoolerKind::Air),
                cooler_max_tdp_w: Some(150),
                compatible_sockets: sockets(&["AM5", "AM4"]),
                ..PartSpecs::default()
            },
        ),
        part(
            "part-per-001",
            "mech-keyboard-tkl",
            "Mechanical Keyboard TKL",
            PartCategory::Peripheral,
            8_900,
            14,
            &["keyboard"],
            PartSpecs::default(),
        ),
        part(
            "part-per-002",
            "monitor-27-qhd",
            "27\" QHD Monitor",
            PartCategory::Peripheral,
            29_900,
            6,
            &["monitor"],
            PartSpecs::default(),
        ),
    ]
}

/// Demo view events, placed relative to `now` so they always fall inside the default window.
pub fn demo_views(now: DateTime<Utc>) -> Vec<ViewEvent> {
    DEMO_VIEWS
        .iter()
        .map(|(id, slug, session, user, hours_ago)| ViewEvent {
            id: ViewEventId(id.to_string()),
            slug: slug.to_string(),
            session_id: session.to_string(),
            user_id: user.map(str::to_string),
            viewed_at: now - Duration::hours(*hours_ago),
        })
        .collect()
}

/// Deterministic demo catalog and browsing history for local runs and tests.
pub struct DemoDataset;

impl DemoDataset {
    /// Upserts the demo catalog and inserts demo views. Re-running does not duplicate views.
    pub async fn load(pool: &DbPool, now: DateTime<Utc>) -> Result<SeedResult, RepositoryError> {
        let catalog = SqlCatalogRepository::new(pool.clone());
        let parts = demo_parts();
        let parts_seeded = parts.len();
        for part in parts {
            catalog.save(part).await?;
        }

        let views = demo_views(now);
        let mut tx = pool.begin().await?;
        let mut views_seeded = 0;
        for view in &views {
            let inserted = sqlx::query(
                "INSERT INTO product_view (id, slug, session_id, user_id, viewed_at)
                 VALUES (?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO NOTHING",
            )
            .bind(&view.id.0)
            .bind(&view.slug)
            .bind(&view.session_id)
            .bind(&view.user_id)
            .bind(encode_timestamp(view.viewed_at))
            .execute(&mut *tx)
            .await?;
            views_seeded += inserted.rows_affected() as usize;
        }
        tx.commit().await?;

        Ok(SeedResult { parts_seeded, views_seeded })
    }

    /// Checks that every demo part and view is present.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let mut checks = Vec::new();

        for part in demo_parts() {
            let exists: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM part WHERE slug = ?1 AND active = 1)",
            )
            .bind(&part.slug)
            .fetch_one(pool)
            .await?;
            checks.push((part.slug, exists == 1));
        }

        for (id, ..) in DEMO_VIEWS {
            let exists: i64 =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM product_view WHERE id = ?1)")
                    .bind(*id)
                    .fetch_one(pool)
                    .await?;
            checks.push((id.to_string(), exists == 1));
        }

        let all_present = checks.iter().all(|(_, exists)| *exists);
        Ok(VerificationResult { all_present, checks })
    }

    /// Removes the demo rows, leaving anything else in place.
    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;

        for (id, ..) in DEMO_VIEWS {
            sqlx::query("DELETE FROM product_view WHERE id = ?1")
                .bind(*id)
                .execute(&mut *tx)
                .await?;
        }
        for part in demo_parts() {
            sqlx::query("DELETE FROM part WHERE id = ?1").bind(&part.id.0).execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct SeedResult {
    pub parts_seeded: usize,
    pub views_seeded: usize,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(String, bool)>,
}
