use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

use crate::merge::{self, ApplicationDraft};
use crate::models::{Application, Note};

pub struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    pub fn open() -> Result<Self> {
        let path = Self::default_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)?;
        // Notes belong to their application; let deletes cascade.
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn, path })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn,
            path: PathBuf::from(":memory:"),
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn default_path() -> Result<PathBuf> {
        // Use XDG data directory or fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "apptrack") {
            Ok(proj_dirs.data_dir().join("apptrack.db"))
        } else {
            // Fallback to current directory
            Ok(PathBuf::from("apptrack.db"))
        }
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS applications (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                company_name TEXT NOT NULL,
                role TEXT NOT NULL,
                application_date TEXT,
                status TEXT,
                contact_person TEXT,
                phone TEXT,
                url TEXT,
                cover_letter INTEGER NOT NULL DEFAULT 0,
                interview_date TEXT,
                offer INTEGER NOT NULL DEFAULT 0,
                salary TEXT,
                equity INTEGER NOT NULL DEFAULT 0,
                bonus REAL,
                health_coverage INTEGER NOT NULL DEFAULT 0,
                pto TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS notes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                application_id INTEGER NOT NULL REFERENCES applications(id) ON DELETE CASCADE,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX IF NOT EXISTS idx_applications_active ON applications(is_active);
            CREATE INDEX IF NOT EXISTS idx_notes_application ON notes(application_id);
            "#,
        )?;
        Ok(())
    }

    pub fn ensure_initialized(&self) -> Result<()> {
        let tables: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='applications'",
            [],
            |row| row.get(0),
        )?;
        if tables == 0 {
            return Err(anyhow!(
                "Database not initialized. Run 'apptrack init' first."
            ));
        }
        Ok(())
    }

    // --- Application operations ---

    const APPLICATION_COLUMNS: &'static str =
        "id, company_name, role, application_date, status, contact_person, phone, url,
         cover_letter, interview_date, offer, salary, equity, bonus, health_coverage,
         pto, is_active, created_at, updated_at";

    pub fn create_application(&self, draft: &ApplicationDraft) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO applications (
                company_name, role, application_date, status, contact_person, phone, url,
                cover_letter, interview_date, offer, salary, equity, bonus,
                health_coverage, pto, is_active
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                draft.company_name,
                draft.role,
                draft.application_date,
                draft.status,
                draft.contact_person,
                draft.phone,
                draft.url,
                draft.cover_letter,
                draft.interview_date,
                draft.offer,
                draft.salary.map(|d| d.to_string()),
                draft.equity,
                draft.bonus,
                draft.health_coverage,
                draft.pto,
                draft.is_active,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_application(&self, id: i64) -> Result<Option<Application>> {
        let result = self.conn.query_row(
            &format!(
                "SELECT {} FROM applications WHERE id = ?1",
                Self::APPLICATION_COLUMNS
            ),
            [id],
            Self::row_to_application,
        );
        match result {
            Ok(app) => Ok(Some(app)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// The three list views: Some(true) = active, Some(false) = inactive,
    /// None = all.
    pub fn list_applications(&self, is_active: Option<bool>) -> Result<Vec<Application>> {
        let mut sql = format!("SELECT {} FROM applications", Self::APPLICATION_COLUMNS);
        if is_active.is_some() {
            sql.push_str(" WHERE is_active = ?1");
        }
        sql.push_str(" ORDER BY id");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = if let Some(active) = is_active {
            stmt.query_map([active], Self::row_to_application)?
        } else {
            stmt.query_map([], Self::row_to_application)?
        };

        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to list applications")
    }

    /// Write every resolved column back. Returns false if the row is gone.
    pub fn update_application(&self, id: i64, draft: &ApplicationDraft) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE applications SET
                company_name = ?1, role = ?2, application_date = ?3, status = ?4,
                contact_person = ?5, phone = ?6, url = ?7, cover_letter = ?8,
                interview_date = ?9, offer = ?10, salary = ?11, equity = ?12,
                bonus = ?13, health_coverage = ?14, pto = ?15, is_active = ?16,
                updated_at = datetime('now')
             WHERE id = ?17",
            params![
                draft.company_name,
                draft.role,
                draft.application_date,
                draft.status,
                draft.contact_person,
                draft.phone,
                draft.url,
                draft.cover_letter,
                draft.interview_date,
                draft.offer,
                draft.salary.map(|d| d.to_string()),
                draft.equity,
                draft.bonus,
                draft.health_coverage,
                draft.pto,
                draft.is_active,
                id,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Removes the application and, through the cascade, its notes.
    pub fn delete_application(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM applications WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    /// Backs both activate and deactivate. Idempotent; false means the id
    /// did not resolve.
    pub fn set_active(&self, id: i64, active: bool) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE applications SET is_active = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![active, id],
        )?;
        Ok(changed > 0)
    }

    fn row_to_application(row: &rusqlite::Row) -> rusqlite::Result<Application> {
        let salary: Option<String> = row.get(11)?;
        let salary = salary
            .map(|s| {
                Decimal::from_str(&s).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        11,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })
            })
            .transpose()?;

        Ok(Application {
            id: row.get(0)?,
            company_name: row.get(1)?,
            role: row.get(2)?,
            application_date: row.get(3)?,
            status: row.get(4)?,
            contact_person: row.get(5)?,
            phone: row.get(6)?,
            url: row.get(7)?,
            cover_letter: row.get(8)?,
            interview_date: row.get(9)?,
            offer: row.get(10)?,
            salary,
            equity: row.get(12)?,
            bonus: row.get(13)?,
            health_coverage: row.get(14)?,
            pto: row.get(15)?,
            is_active: row.get(16)?,
            created_at: row.get(17)?,
            updated_at: row.get(18)?,
        })
    }

    // --- Note operations ---

    /// Stamps the content with the current wall clock and appends it.
    /// Returns None (and writes nothing) if the application does not exist.
    pub fn add_note(&self, application_id: i64, content: &str) -> Result<Option<i64>> {
        if self.get_application(application_id)?.is_none() {
            return Ok(None);
        }
        let stamped = merge::stamp_note(content, Local::now().naive_local());
        self.conn.execute(
            "INSERT INTO notes (application_id, content) VALUES (?1, ?2)",
            params![application_id, stamped],
        )?;
        Ok(Some(self.conn.last_insert_rowid()))
    }

    /// Most-recent-first by id.
    pub fn list_notes(&self, application_id: i64) -> Result<Vec<Note>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, application_id, content, created_at
             FROM notes WHERE application_id = ?1 ORDER BY id DESC",
        )?;
        let rows = stmt.query_map([application_id], |row| {
            Ok(Note {
                id: row.get(0)?,
                application_id: row.get(1)?,
                content: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to list notes")
    }

    #[cfg(test)]
    fn count_notes(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.init().unwrap();
        db
    }

    fn draft(company: &str, role: &str) -> ApplicationDraft {
        ApplicationDraft {
            company_name: company.to_string(),
            role: role.to_string(),
            application_date: None,
            status: None,
            contact_person: None,
            phone: None,
            url: None,
            cover_letter: false,
            interview_date: None,
            offer: false,
            salary: None,
            equity: false,
            bonus: None,
            health_coverage: false,
            pto: None,
            is_active: true,
        }
    }

    #[test]
    fn test_create_and_get_roundtrip() {
        let db = test_db();
        let mut d = draft("Initech", "Staff Engineer");
        d.application_date = NaiveDate::from_ymd_opt(2024, 1, 10);
        d.salary = Some(Decimal::from_str("85000.50").unwrap());
        d.bonus = Some(0.125);
        d.url = Some("https://initech.example/".to_string());
        d.offer = true;

        let id = db.create_application(&d).unwrap();
        let app = db.get_application(id).unwrap().unwrap();
        assert_eq!(app.company_name, "Initech");
        assert_eq!(app.application_date, NaiveDate::from_ymd_opt(2024, 1, 10));
        assert_eq!(app.salary, Some(Decimal::from_str("85000.50").unwrap()));
        assert_eq!(app.bonus, Some(0.125));
        assert_eq!(app.url, Some("https://initech.example/".to_string()));
        assert!(app.offer);
        assert!(app.is_active);
    }

    #[test]
    fn test_get_missing_application() {
        let db = test_db();
        assert!(db.get_application(99).unwrap().is_none());
    }

    #[test]
    fn test_list_views() {
        let db = test_db();
        let a = db.create_application(&draft("A", "Dev")).unwrap();
        let b = db.create_application(&draft("B", "Dev")).unwrap();
        db.create_application(&draft("C", "Dev")).unwrap();
        db.set_active(b, false).unwrap();

        let active = db.list_applications(Some(true)).unwrap();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].id, a);

        let inactive = db.list_applications(Some(false)).unwrap();
        assert_eq!(inactive.len(), 1);
        assert_eq!(inactive[0].id, b);

        assert_eq!(db.list_applications(None).unwrap().len(), 3);
    }

    #[test]
    fn test_update_writes_all_columns() {
        let db = test_db();
        let id = db.create_application(&draft("Initech", "Dev")).unwrap();

        let mut d = draft("Initrode", "Senior Dev");
        d.salary = Some(Decimal::from_str("120000").unwrap());
        d.cover_letter = true;
        assert!(db.update_application(id, &d).unwrap());

        let app = db.get_application(id).unwrap().unwrap();
        assert_eq!(app.company_name, "Initrode");
        assert_eq!(app.role, "Senior Dev");
        assert_eq!(app.salary, Some(Decimal::from_str("120000").unwrap()));
        assert!(app.cover_letter);
    }

    #[test]
    fn test_update_missing_application() {
        let db = test_db();
        assert!(!db.update_application(99, &draft("A", "B")).unwrap());
        assert!(db.list_applications(None).unwrap().is_empty());
    }

    #[test]
    fn test_activate_idempotent() {
        let db = test_db();
        let id = db.create_application(&draft("A", "Dev")).unwrap();
        db.set_active(id, false).unwrap();
        assert!(!db.get_application(id).unwrap().unwrap().is_active);

        assert!(db.set_active(id, true).unwrap());
        assert!(db.set_active(id, true).unwrap());
        assert!(db.get_application(id).unwrap().unwrap().is_active);
    }

    #[test]
    fn test_set_active_missing_application() {
        let db = test_db();
        assert!(!db.set_active(99, true).unwrap());
        assert!(!db.set_active(99, false).unwrap());
    }

    #[test]
    fn test_add_and_list_notes_most_recent_first() {
        let db = test_db();
        let id = db.create_application(&draft("A", "Dev")).unwrap();
        let first = db.add_note(id, "Applied online").unwrap().unwrap();
        let second = db.add_note(id, "Called recruiter").unwrap().unwrap();

        let notes = db.list_notes(id).unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].id, second);
        assert_eq!(notes[1].id, first);
        assert!(notes[0].content.ends_with("-- Called recruiter"));
        assert!(notes[0].content.starts_with('['));
    }

    #[test]
    fn test_add_note_missing_application() {
        let db = test_db();
        assert!(db.add_note(99, "hello").unwrap().is_none());
        assert_eq!(db.count_notes().unwrap(), 0);
    }

    #[test]
    fn test_delete_cascades_notes() {
        let db = test_db();
        let id = db.create_application(&draft("A", "Dev")).unwrap();
        db.add_note(id, "Applied").unwrap();
        db.add_note(id, "Rejected").unwrap();

        assert!(db.delete_application(id).unwrap());
        assert!(db.get_application(id).unwrap().is_none());
        assert_eq!(db.count_notes().unwrap(), 0);
    }

    #[test]
    fn test_delete_missing_application() {
        let db = test_db();
        assert!(!db.delete_application(99).unwrap());
    }
}
