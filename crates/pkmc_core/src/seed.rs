//! Static reference data (item types, blocks, extensions, languages).
//!
//! # Responsibility
//! - Upsert the catalog reference rows used by the item service.
//!
//! # Invariants
//! - Seeding is idempotent: existing rows (matched by any unique key) are
//!   left untouched.
//! - All four tables are seeded in one transaction.
//! - Blocks are seeded before the extensions that reference them.

use crate::context::OpContext;
use crate::db::{Store, StoreError};
use crate::repo::unit_of_work::{TxError, UnitOfWork};
use chrono::NaiveDate;
use log::info;
use rusqlite::params;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SeedResult<T> = Result<T, SeedError>;

#[derive(Debug)]
pub enum SeedError {
    /// Inserting rows into `table` failed.
    Store {
        table: &'static str,
        source: StoreError,
    },
    Transaction(TxError),
    /// A hard-coded release date is not a valid calendar date.
    InvalidDate { code: &'static str },
}

impl Display for SeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store { table, source } => write!(f, "seeding `{table}` failed: {source}"),
            Self::Transaction(err) => write!(f, "{err}"),
            Self::InvalidDate { code } => write!(f, "invalid release date for `{code}`"),
        }
    }
}

impl Error for SeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store { source, .. } => Some(source),
            Self::Transaction(err) => Some(err),
            Self::InvalidDate { .. } => None,
        }
    }
}

impl From<TxError> for SeedError {
    fn from(value: TxError) -> Self {
        Self::Transaction(value)
    }
}

/// Number of rows inserted per table by one seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub item_types: usize,
    pub blocks: usize,
    pub extensions: usize,
    pub languages: usize,
}

impl SeedReport {
    pub fn total(&self) -> usize {
        self.item_types + self.blocks + self.extensions + self.languages
    }
}

/// `(name, code, release date)`.
type BlockSeed = (&'static str, &'static str, (i32, u32, u32));
/// `(name, code, block code, release date)`.
type ExtensionSeed = (&'static str, &'static str, &'static str, (i32, u32, u32));

const ITEM_TYPES: &[&str] = &["ETB", "Display", "Bundle", "Booster", "Sleeve Booster"];

const BLOCKS: &[BlockSeed] = &[
    ("Épée et Bouclier", "EB", (2020, 2, 7)),
    ("Écarlate et Violet", "EV", (2023, 3, 31)),
    ("Méga-Évolution", "ME", (2025, 10, 10)),
];

const EXTENSIONS: &[ExtensionSeed] = &[
    ("Épée et Bouclier", "SSH", "EB", (2020, 2, 7)),
    ("Promos Épée et Bouclier", "SWSH", "EB", (2020, 2, 7)),
    ("Clash des Rebelles", "RCL", "EB", (2020, 5, 1)),
    ("Ténèbres Embrasées", "DAA", "EB", (2020, 8, 14)),
    ("La Voie du Maître", "CPA", "EB", (2020, 9, 25)),
    ("Voltage Éclatant", "VIV", "EB", (2020, 11, 13)),
    ("Destinées Radieuses", "SHF", "EB", (2021, 2, 19)),
    ("Styles de Combat", "BST", "EB", (2021, 3, 19)),
    ("Règne de Glace", "CRE", "EB", (2021, 6, 18)),
    ("Évolution Céleste", "EVS", "EB", (2021, 8, 27)),
    ("Célébrations", "CEL", "EB", (2021, 10, 8)),
    ("Poing de Fusion", "FST", "EB", (2021, 11, 12)),
    ("Stars Étincelantes", "BRS", "EB", (2022, 2, 25)),
    ("Astres Radieux", "ASR", "EB", (2022, 5, 27)),
    ("Pokémon GO", "PGO", "EB", (2022, 7, 1)),
    ("Tempête Argentée", "SIT", "EB", (2022, 11, 11)),
    ("Zénith Suprême", "CRZ", "EB", (2023, 2, 27)),
    ("Écarlate et Violet", "SVI", "EV", (2023, 3, 31)),
    ("Promos Écarlate et Violet", "SVP", "EV", (2023, 3, 31)),
    ("Évolutions à Paldea", "PAL", "EV", (2023, 6, 9)),
    ("Flammes Obsidiennes", "OBF", "EV", (2023, 8, 11)),
    ("151", "MEW", "EV", (2023, 9, 22)),
    ("Faille Paradoxe", "PAR", "EV", (2023, 11, 3)),
    ("Destinées de Paldea", "PAF", "EV", (2024, 1, 26)),
    ("Forces Temporelles", "TEF", "EV", (2024, 3, 22)),
    ("Mascarade Crépusculaire", "TWM", "EV", (2024, 5, 24)),
    ("Fable Nébuleuse", "SFA", "EV", (2024, 8, 8)),
    ("Couronne Stellaire", "SCR", "EV", (2024, 9, 13)),
    ("Étincelles Déferlantes", "SSP", "EV", (2024, 11, 11)),
    ("Évolutions Prismatiques", "PRE", "EV", (2025, 1, 17)),
    ("Aventures Ensemble", "JTG", "EV", (2025, 3, 28)),
    ("Rivalités Destinées", "DRI", "EV", (2025, 5, 30)),
    ("Flamme Blanche", "WHT", "EV", (2025, 7, 18)),
    ("Foudre Noire", "BLK", "EV", (2025, 7, 18)),
    ("Méga-Évolution", "MEG", "ME", (2025, 10, 10)),
    ("Promos Méga-Évolution", "MEP", "ME", (2025, 10, 10)),
    ("Flammes Fantasmagoriques", "PFL", "ME", (2025, 11, 14)),
];

const LANGUAGES: &[(&str, &str)] = &[
    ("fr", "Français"),
    ("en", "English"),
    ("de", "Deutsch"),
    ("es", "Español"),
];

/// Inserts missing reference rows and reports how many were added.
pub fn seed_reference_data(store: &Store, ctx: &OpContext) -> SeedResult<SeedReport> {
    let report = UnitOfWork::new(store).run(ctx, |uow| {
        Ok::<_, SeedError>(SeedReport {
            item_types: seed_item_types(uow, ctx)?,
            blocks: seed_blocks(uow, ctx)?,
            extensions: seed_extensions(uow, ctx)?,
            languages: seed_languages(uow, ctx)?,
        })
    })?;

    info!(
        "event=seed_reference module=seed status=ok item_types={} blocks={} extensions={} languages={}",
        report.item_types, report.blocks, report.extensions, report.languages
    );
    Ok(report)
}

fn seed_item_types(uow: &UnitOfWork<'_>, ctx: &OpContext) -> SeedResult<usize> {
    uow.scope()
        .with_connection(ctx, |conn| {
            let mut stmt = conn.prepare(
                "INSERT INTO item_types (name) VALUES (?1)
                 ON CONFLICT DO NOTHING;",
            )?;
            let mut inserted = 0;
            for name in ITEM_TYPES {
                inserted += stmt.execute([name])?;
            }
            Ok(inserted)
        })
        .map_err(|source| SeedError::Store {
            table: "item_types",
            source,
        })
}

fn seed_blocks(uow: &UnitOfWork<'_>, ctx: &OpContext) -> SeedResult<usize> {
    let rows = BLOCKS
        .iter()
        .map(|(name, code, date)| Ok((*name, *code, to_date(code, *date)?)))
        .collect::<SeedResult<Vec<_>>>()?;

    uow.scope()
        .with_connection(ctx, |conn| {
            let mut stmt = conn.prepare(
                "INSERT INTO blocks (name, code, release_date) VALUES (?1, ?2, ?3)
                 ON CONFLICT DO NOTHING;",
            )?;
            let mut inserted = 0;
            for (name, code, release_date) in &rows {
                inserted += stmt.execute(params![name, code, release_date])?;
            }
            Ok(inserted)
        })
        .map_err(|source| SeedError::Store {
            table: "blocks",
            source,
        })
}

fn seed_extensions(uow: &UnitOfWork<'_>, ctx: &OpContext) -> SeedResult<usize> {
    let rows = EXTENSIONS
        .iter()
        .map(|(name, code, block_code, date)| {
            Ok((*name, *code, *block_code, to_date(code, *date)?))
        })
        .collect::<SeedResult<Vec<_>>>()?;

    uow.scope()
        .with_connection(ctx, |conn| {
            // The WHERE clause keeps SQLite from reading ON CONFLICT as a join constraint.
            let mut stmt = conn.prepare(
                "INSERT INTO extensions (name, code, block_id, release_date)
                 SELECT ?1, ?2, id, ?4 FROM blocks WHERE code = ?3
                 ON CONFLICT DO NOTHING;",
            )?;
            let mut inserted = 0;
            for (name, code, block_code, release_date) in &rows {
                inserted += stmt.execute(params![name, code, block_code, release_date])?;
            }
            Ok(inserted)
        })
        .map_err(|source| SeedError::Store {
            table: "extensions",
            source,
        })
}

fn seed_languages(uow: &UnitOfWork<'_>, ctx: &OpContext) -> SeedResult<usize> {
    uow.scope()
        .with_connection(ctx, |conn| {
            let mut stmt = conn.prepare(
                "INSERT INTO languages (code, name) VALUES (?1, ?2)
                 ON CONFLICT DO NOTHING;",
            )?;
            let mut inserted = 0;
            for (code, name) in LANGUAGES {
                inserted += stmt.execute([code, name])?;
            }
            Ok(inserted)
        })
        .map_err(|source| SeedError::Store {
            table: "languages",
            source,
        })
}

fn to_date(code: &'static str, (year, month, day): (i32, u32, u32)) -> SeedResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(SeedError::InvalidDate { code })
}
