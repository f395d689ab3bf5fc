//! One-time legacy CSV to JSON migration
//!
//! Earlier releases kept the directory as four CSV files. Migration
//! converts each category into its JSON document independently, so one bad
//! category never blocks the others, and is gated on a fresh backup of
//! the whole data root because the originals are renamed afterwards.
//! Renamed, not deleted: a migrated source becomes
//! `<file>.<stamp>.migrated` and stays inspectable forever.
//!
//! # Workflow
//!
//! 1. `needs_migration()` on startup: cheap, read-only probe
//! 2. `migrate_all()` calls the [`Backup`] collaborator; no snapshot path,
//!    no migration
//! 3. Each category parses its CSV (header-driven, aliases matched
//!    case-insensitively), writes its JSON through the [`DocumentStore`],
//!    then archives the source
//! 4. The aggregate result reports per-category counts and errors;
//!    `success` means zero errors anywhere

mod csv;

use crate::backup::Backup;
use crate::home::files;
use crate::io::store::DocumentStore;
use crate::schema::{BridgeGroup, Contact, OncallEntry, Server};
use csv::CsvTable;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of one category's conversion.
#[derive(Debug, Clone)]
pub struct CategoryResult {
    pub category: &'static str,
    pub migrated: usize,
    pub errors: Vec<String>,
}

/// Aggregate outcome of a migration run. Immutable once returned.
#[derive(Debug, Clone)]
pub struct MigrationResult {
    /// True only when zero errors accumulated across all categories.
    pub success: bool,
    /// Snapshot taken before any original was touched.
    pub backup_path: Option<PathBuf>,
    pub categories: Vec<CategoryResult>,
}

impl MigrationResult {
    fn aborted(message: String) -> Self {
        MigrationResult {
            success: false,
            backup_path: None,
            categories: vec![CategoryResult {
                category: "backup",
                migrated: 0,
                errors: vec![message],
            }],
        }
    }

    /// Total records converted across all categories.
    pub fn migrated_total(&self) -> usize {
        self.categories.iter().map(|c| c.migrated).sum()
    }
}

const CATEGORIES: [(&str, &str, &str); 4] = [
    ("contacts", files::LEGACY_CONTACTS, files::CONTACTS),
    ("servers", files::LEGACY_SERVERS, files::SERVERS),
    ("oncall", files::LEGACY_ONCALL, files::ONCALL),
    ("groups", files::LEGACY_GROUPS, files::BRIDGE_GROUPS),
];

/// Coordinates the lazy, backup-guarded CSV conversion.
#[derive(Debug, Default)]
pub struct MigrationCoordinator {
    store: DocumentStore,
}

impl MigrationCoordinator {
    pub fn new(store: DocumentStore) -> Self {
        Self { store }
    }

    /// Whether any category still has unconverted legacy data.
    ///
    /// True when a legacy CSV exists without its JSON counterpart, or the
    /// counterpart exists but is empty while the CSV has data rows, the
    /// signature of a previously interrupted migration.
    pub fn needs_migration(root: &Path) -> bool {
        CATEGORIES
            .iter()
            .any(|(_, legacy, modern)| category_needs_migration(root, legacy, modern))
    }

    /// Run the migration when needed; `None` means nothing to do.
    pub fn run_if_needed(
        &self,
        root: &Path,
        backup: &dyn Backup,
    ) -> Option<MigrationResult> {
        if !Self::needs_migration(root) {
            return None;
        }
        Some(self.migrate_all(root, backup))
    }

    /// Convert every pending category, gated on a fresh backup.
    ///
    /// When the backup collaborator fails or declines, the run aborts with
    /// `success: false` and zero side effects on the originals.
    pub fn migrate_all(&self, root: &Path, backup: &dyn Backup) -> MigrationResult {
        let backup_path = match backup.perform_backup(root, "pre-migration") {
            Ok(Some(path)) => path,
            Ok(None) => {
                tracing::error!("migration aborted: backup collaborator produced no snapshot");
                return MigrationResult::aborted(
                    "backup produced no snapshot path; originals untouched".to_string(),
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "migration aborted: backup failed");
                return MigrationResult::aborted(format!(
                    "backup failed: {e}; originals untouched"
                ));
            }
        };

        let mut categories = Vec::new();
        for (name, legacy, modern) in CATEGORIES {
            if !category_needs_migration(root, legacy, modern) {
                continue;
            }
            let result = self.migrate_category(root, name, legacy, modern);
            tracing::info!(
                category = name,
                migrated = result.migrated,
                errors = result.errors.len(),
                "category migration finished"
            );
            categories.push(result);
        }

        let success = categories.iter().all(|c| c.errors.is_empty());
        MigrationResult {
            success,
            backup_path: Some(backup_path),
            categories,
        }
    }

    fn migrate_category(
        &self,
        root: &Path,
        name: &'static str,
        legacy: &str,
        modern: &str,
    ) -> CategoryResult {
        let legacy_path = root.join(legacy);
        let modern_path = root.join(modern);
        let mut result = CategoryResult {
            category: name,
            migrated: 0,
            errors: Vec::new(),
        };

        let text = match fs::read_to_string(&legacy_path) {
            Ok(text) => text,
            Err(e) => {
                result.errors.push(format!("read {legacy}: {e}"));
                return result;
            }
        };
        let Some(table) = CsvTable::parse(&text) else {
            result.errors.push(format!("{legacy}: no header row"));
            return result;
        };

        let written = match name {
            "contacts" => convert_contacts(&table)
                .and_then(|records| self.replace_json(&modern_path, records)),
            "servers" => convert_servers(&table)
                .and_then(|records| self.replace_json(&modern_path, records)),
            "oncall" => convert_oncall(&table)
                .and_then(|records| self.replace_json(&modern_path, records)),
            "groups" => self.replace_json(&modern_path, convert_groups(&table)),
            _ => unreachable!("unknown category"),
        };

        match written {
            Ok(count) => {
                result.migrated = count;
                if let Err(e) = archive_legacy(&legacy_path) {
                    result.errors.push(format!("archive {legacy}: {e}"));
                }
            }
            Err(e) => result.errors.push(e),
        }
        result
    }

    fn replace_json<T: serde::Serialize + serde::de::DeserializeOwned + Clone>(
        &self,
        path: &Path,
        records: Vec<T>,
    ) -> Result<usize, String> {
        let count = records.len();
        self.store
            .read_modify_write_json(path, Vec::new(), move |_| records.clone())
            .map(|()| count)
            .map_err(|e| e.to_string())
    }
}

fn category_needs_migration(root: &Path, legacy: &str, modern: &str) -> bool {
    let legacy_path = root.join(legacy);
    if !legacy_path.is_file() {
        return false;
    }
    let modern_path = root.join(modern);
    if !modern_path.is_file() {
        return true;
    }
    // Counterpart present: only an empty document next to a non-empty CSV
    // marks an interrupted run.
    let modern_empty = fs::read_to_string(&modern_path)
        .map(|text| match serde_json::from_str::<Value>(text.trim_start_matches('\u{feff}')) {
            Ok(Value::Array(items)) => items.is_empty(),
            Ok(Value::Object(map)) => map.is_empty(),
            Ok(_) => false,
            Err(_) => text.trim().is_empty(),
        })
        .unwrap_or(false);
    if !modern_empty {
        return false;
    }
    fs::read_to_string(&legacy_path)
        .ok()
        .and_then(|text| CsvTable::parse(&text))
        .is_some_and(|table| table.has_data())
}

/// Rename a converted source to `<file>.<stamp>.migrated`.
fn archive_legacy(legacy_path: &Path) -> std::io::Result<()> {
    let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S");
    let mut os = legacy_path.as_os_str().to_os_string();
    os.push(format!(".{stamp}.migrated"));
    fs::rename(legacy_path, PathBuf::from(os))
}

fn extra_fields(
    table: &CsvTable,
    row: &[String],
    known: &[usize],
) -> HashMap<String, Value> {
    table
        .headers
        .iter()
        .enumerate()
        .filter(|(i, header)| !known.contains(i) && !header.is_empty() && !row[*i].is_empty())
        .map(|(i, header)| (header.clone(), Value::String(row[i].clone())))
        .collect()
}

fn convert_contacts(table: &CsvTable) -> Result<Vec<Contact>, String> {
    let name = table.column(&["name", "full name", "contact name"]);
    let email = table.column(&["email", "e-mail", "mail", "email address"]);
    if name.is_none() && email.is_none() {
        return Err("contacts.csv: no name or email column recognized".to_string());
    }
    let phone = table.column(&["phone", "telephone", "phone number", "mobile"]);
    let title = table.column(&["title", "job title", "position"]);
    let known: Vec<usize> = [name, email, phone, title].into_iter().flatten().collect();

    let cell = |row: &[String], idx: Option<usize>| {
        idx.map(|i| row[i].clone()).unwrap_or_default()
    };

    Ok(table
        .rows
        .iter()
        .filter(|row| {
            name.is_some_and(|i| !row[i].is_empty()) || email.is_some_and(|i| !row[i].is_empty())
        })
        .map(|row| Contact {
            name: cell(row, name),
            email: cell(row, email),
            phone: cell(row, phone),
            title: cell(row, title),
            extra: extra_fields(table, row, &known),
        })
        .collect())
}

fn convert_servers(table: &CsvTable) -> Result<Vec<Server>, String> {
    let name = table
        .column(&["name", "server", "server name", "hostname"])
        .ok_or_else(|| "servers.csv: no server name column recognized".to_string())?;
    let business_area = table.column(&["business area", "businessarea", "ba"]);
    let lob = table.column(&["lob", "line of business"]);
    let comment = table.column(&["comment", "comments", "notes", "description"]);
    let owner = table.column(&["owner", "owner email"]);
    let contact = table.column(&["contact", "support", "support contact"]);
    let os_type = table.column(&["os type", "ostype", "platform"]);
    let os = table.column(&["os", "operating system", "os version"]);
    let mut known = vec![name];
    known.extend(
        [business_area, lob, comment, owner, contact, os_type, os]
            .into_iter()
            .flatten(),
    );

    let cell = |row: &[String], idx: Option<usize>| {
        idx.map(|i| row[i].clone()).unwrap_or_default()
    };

    Ok(table
        .rows
        .iter()
        .filter(|row| !row[name].is_empty())
        .map(|row| Server {
            name: row[name].clone(),
            business_area: cell(row, business_area),
            lob: cell(row, lob),
            comment: cell(row, comment),
            owner: cell(row, owner),
            contact: cell(row, contact),
            os_type: cell(row, os_type),
            os: cell(row, os),
            extra: extra_fields(table, row, &known),
        })
        .collect())
}

/// Convert an on-call roster, detecting the schema variant from headers.
///
/// Legacy rosters carry `Team,Primary,Backup` columns (one row per team,
/// two names). The modern shape is one row per assignment:
/// `Team,Role,Name,Contact`.
fn convert_oncall(table: &CsvTable) -> Result<Vec<OncallEntry>, String> {
    let team = table
        .column(&["team", "team name", "group"])
        .ok_or_else(|| "oncall.csv: no team column recognized".to_string())?;
    let primary = table.column(&["primary", "primary oncall"]);
    let backup = table.column(&["backup", "secondary", "backup oncall"]);

    if primary.is_some() || backup.is_some() {
        // Legacy two-names-per-row variant.
        let mut entries = Vec::new();
        for row in &table.rows {
            if row[team].is_empty() {
                continue;
            }
            for (role, idx) in [("Primary", primary), ("Backup", backup)] {
                if let Some(i) = idx {
                    if !row[i].is_empty() {
                        entries.push(OncallEntry {
                            team: row[team].clone(),
                            role: role.to_string(),
                            name: row[i].clone(),
                            contact: String::new(),
                            extra: HashMap::new(),
                        });
                    }
                }
            }
        }
        return Ok(entries);
    }

    let role = table
        .column(&["role"])
        .ok_or_else(|| "oncall.csv: neither Primary/Backup nor Role columns found".to_string())?;
    let name = table
        .column(&["name", "person"])
        .ok_or_else(|| "oncall.csv: no name column recognized".to_string())?;
    let contact = table.column(&["contact", "email", "phone"]);
    let known: Vec<usize> = [Some(team), Some(role), Some(name), contact]
        .into_iter()
        .flatten()
        .collect();

    Ok(table
        .rows
        .iter()
        .filter(|row| !row[team].is_empty() && !row[name].is_empty())
        .map(|row| OncallEntry {
            team: row[team].clone(),
            role: row[role].clone(),
            name: row[name].clone(),
            contact: contact.map(|i| row[i].clone()).unwrap_or_default(),
            extra: extra_fields(table, row, &known),
        })
        .collect())
}

/// Degenerate the column-oriented group matrix into `{name, members}`.
///
/// Each header is a group name and the cells below it are member emails.
/// Empty cells are skipped, duplicates within a column collapse to the
/// first occurrence, and a column with zero populated cells disappears
/// from the output entirely.
fn convert_groups(table: &CsvTable) -> Vec<BridgeGroup> {
    table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, header)| !header.is_empty())
        .filter_map(|(col, header)| {
            let mut members: Vec<String> = Vec::new();
            for row in &table.rows {
                let cell = row[col].trim();
                if cell.is_empty() {
                    continue;
                }
                if !members.iter().any(|m| m.eq_ignore_ascii_case(cell)) {
                    members.push(cell.to_string());
                }
            }
            if members.is_empty() {
                return None;
            }
            Some(BridgeGroup {
                name: header.clone(),
                members,
                extra: HashMap::new(),
            })
        })
        .collect()
}
