//! SQLite repository implementation.
//!
//! Local-first persistence in a single database file. The connection sits
//! behind a `parking_lot::Mutex`; statements are short and never held across
//! an `.await`, so async callers only contend on the lock.
//!
//! The `(template_id, slot_date)` unique index is what makes concurrent slot
//! generation safe: a second insert for the same date fails with
//! [`RepositoryError::Conflict`].

mod schema;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{info, warn};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::db::repository::*;
use crate::models::*;

/// Default database file name.
pub const DEFAULT_SQLITE_PATH: &str = "rapport.db";

/// Connection settings for [`SqliteRepository`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteConfig {
    pub path: PathBuf,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_SQLITE_PATH),
        }
    }
}

impl SqliteConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read `SQLITE_PATH`, falling back to [`DEFAULT_SQLITE_PATH`].
    pub fn from_env() -> Self {
        match std::env::var("SQLITE_PATH") {
            Ok(path) if !path.trim().is_empty() => Self::new(path.trim()),
            _ => Self::default(),
        }
    }
}

/// SQLite-backed repository.
pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl SqliteRepository {
    /// Open (or create) the database file and run migrations.
    pub fn open(path: impl AsRef<Path>) -> RepositoryResult<Self> {
        let path = path.as_ref();
        info!("Opening SQLite store at {:?}", path);
        let conn = Connection::open(path).map_err(|e| {
            RepositoryError::connection_with_context(
                e.to_string(),
                ErrorContext::new("open").with_details(path.display().to_string()),
            )
        })?;
        // WAL is unavailable for some filesystems; the default journal works too
        if let Err(e) = conn.execute_batch("PRAGMA journal_mode=WAL;") {
            warn!("Could not enable WAL journal for {:?}: {}", path, e);
        }
        Self::from_connection(conn)
    }

    pub fn from_config(config: &SqliteConfig) -> RepositoryResult<Self> {
        Self::open(&config.path)
    }

    /// Fresh private in-memory database.
    pub fn open_in_memory() -> RepositoryResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| RepositoryError::connection(e.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> RepositoryResult<Self> {
        schema::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

// ==================== Row mapping ====================

fn parse_text<T>(idx: usize, value: String) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    value
        .parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

const TEMPLATE_COLUMNS: &str = "id, name, description, category, recurrence_type, interval, \
     day_of_week, day_of_month, week_of_month, time_of_day, max_attendees, active";

fn template_from_row(row: &Row<'_>) -> rusqlite::Result<EventTemplate> {
    Ok(EventTemplate {
        id: Some(TemplateId(row.get(0)?)),
        name: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        rule: RecurrenceRule {
            recurrence_type: parse_text(4, row.get(4)?)?,
            interval: row.get(5)?,
            day_of_week: row.get(6)?,
            day_of_month: row.get(7)?,
            week_of_month: row.get(8)?,
            time_of_day: row.get(9)?,
            max_attendees: row.get(10)?,
        },
        active: row.get(11)?,
    })
}

const SLOT_COLUMNS: &str = "id, template_id, slot_date, slot_time, status";

fn slot_from_row(row: &Row<'_>) -> rusqlite::Result<Slot> {
    Ok(Slot {
        id: Some(SlotId(row.get(0)?)),
        template_id: TemplateId(row.get(1)?),
        date: row.get(2)?,
        time: row.get(3)?,
        status: parse_text(4, row.get(4)?)?,
    })
}

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<InteractionEvent> {
    Ok(InteractionEvent {
        date: row.get(0)?,
        kind: row.get(1)?,
    })
}

fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: Some(ContactId(row.get(0)?)),
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        family_id: row.get::<_, Option<i64>>(3)?.map(FamilyId),
        birthday: row.get(4)?,
    })
}

fn slot_not_found(operation: &str, id: SlotId) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("Slot {} not found", id),
        ErrorContext::new(operation)
            .with_entity("slot")
            .with_entity_id(id),
    )
}

fn reminder_not_found(operation: &str, id: ReminderId) -> RepositoryError {
    RepositoryError::not_found_with_context(
        format!("Reminder {} not found", id),
        ErrorContext::new(operation)
            .with_entity("reminder")
            .with_entity_id(id),
    )
}

const REMINDER_COLUMNS: &str =
    "id, kind, title, description, due_date, repeat_interval, completed, completed_on";

fn reminder_from_row(row: &Row<'_>) -> rusqlite::Result<Reminder> {
    Ok(Reminder {
        id: Some(ReminderId(row.get(0)?)),
        kind: parse_text(1, row.get(1)?)?,
        title: row.get(2)?,
        description: row.get(3)?,
        due_date: row.get(4)?,
        repeat: parse_text(5, row.get(5)?)?,
        completed: row.get(6)?,
        completed_on: row.get(7)?,
        contact_ids: Vec::new(),
        family_ids: Vec::new(),
    })
}

/// Fill in the contact and family links of a loaded reminder.
fn load_reminder_links(conn: &Connection, reminder: &mut Reminder) -> RepositoryResult<()> {
    let Some(id) = reminder.id else {
        return Ok(());
    };
    let mut stmt = conn.prepare(
        "SELECT contact_id FROM reminder_contacts WHERE reminder_id = ?1 ORDER BY contact_id",
    )?;
    reminder.contact_ids = stmt
        .query_map(params![id.value()], |row| Ok(ContactId(row.get(0)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare(
        "SELECT family_id FROM reminder_families WHERE reminder_id = ?1 ORDER BY family_id",
    )?;
    reminder.family_ids = stmt
        .query_map(params![id.value()], |row| Ok(FamilyId(row.get(0)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(())
}

fn exists(conn: &Connection, table: &str, id: i64) -> RepositoryResult<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ?1)", table);
    Ok(conn.query_row(&sql, params![id], |row| row.get(0))?)
}

fn require(conn: &Connection, table: &str, entity: &str, id: i64) -> RepositoryResult<()> {
    if exists(conn, table, id)? {
        Ok(())
    } else {
        Err(RepositoryError::validation(format!(
            "Unknown {} {}",
            entity, id
        )))
    }
}

fn query_events(
    conn: &Connection,
    sql: &str,
    id: i64,
) -> RepositoryResult<Vec<InteractionEvent>> {
    let mut stmt = conn.prepare(sql)?;
    let events = stmt
        .query_map(params![id], event_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(events)
}

fn load_group(conn: &Connection, id: GroupId) -> RepositoryResult<Option<InviteGroup>> {
    let group = conn
        .query_row(
            "SELECT id, name, family_id FROM invite_groups WHERE id = ?1",
            params![id.value()],
            |row| {
                Ok(InviteGroup {
                    id: Some(GroupId(row.get(0)?)),
                    name: row.get(1)?,
                    family_id: row.get::<_, Option<i64>>(2)?.map(FamilyId),
                    member_ids: Vec::new(),
                })
            },
        )
        .optional()?;

    let Some(mut group) = group else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT contact_id FROM invite_group_members WHERE group_id = ?1 ORDER BY contact_id",
    )?;
    group.member_ids = stmt
        .query_map(params![id.value()], |row| Ok(ContactId(row.get(0)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(Some(group))
}

// ==================== Templates & Slots ====================

#[async_trait]
impl TemplateRepository for SqliteRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        let conn = self.conn.lock();
        Ok(conn
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .is_ok())
    }

    async fn store_template(&self, template: &EventTemplate) -> RepositoryResult<EventTemplate> {
        let conn = self.conn.lock();
        let rule = &template.rule;
        conn.execute(
            "INSERT INTO event_templates
                (id, name, description, category, recurrence_type, interval, day_of_week,
                 day_of_month, week_of_month, time_of_day, max_attendees, active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description,
                category = excluded.category,
                recurrence_type = excluded.recurrence_type,
                interval = excluded.interval,
                day_of_week = excluded.day_of_week,
                day_of_month = excluded.day_of_month,
                week_of_month = excluded.week_of_month,
                time_of_day = excluded.time_of_day,
                max_attendees = excluded.max_attendees,
                active = excluded.active",
            params![
                template.id.map(|id| id.value()),
                template.name,
                template.description,
                template.category,
                rule.recurrence_type.to_string(),
                rule.interval,
                rule.day_of_week,
                rule.day_of_month,
                rule.week_of_month,
                rule.time_of_day,
                rule.max_attendees,
                template.active,
            ],
        )
        .map_err(|e| RepositoryError::from(e).with_operation("store_template"))?;

        let id = match template.id {
            Some(id) => id,
            None => TemplateId(conn.last_insert_rowid()),
        };
        let mut stored = template.clone();
        stored.id = Some(id);
        Ok(stored)
    }

    async fn get_template(&self, id: TemplateId) -> RepositoryResult<EventTemplate> {
        let conn = self.conn.lock();
        let sql = format!("SELECT {} FROM event_templates WHERE id = ?1", TEMPLATE_COLUMNS);
        conn.query_row(&sql, params![id.value()], template_from_row)
            .optional()?
            .ok_or_else(|| {
                RepositoryError::not_found_with_context(
                    format!("Template {} not found", id),
                    ErrorContext::new("get_template")
                        .with_entity("template")
                        .with_entity_id(id),
                )
            })
    }

    async fn list_templates(&self) -> RepositoryResult<Vec<EventTemplate>> {
        let conn = self.conn.lock();
        let sql = format!("SELECT {} FROM event_templates ORDER BY id", TEMPLATE_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let templates = stmt
            .query_map([], template_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(templates)
    }

    async fn insert_slot(&self, slot: &Slot) -> RepositoryResult<Slot> {
        let conn = self.conn.lock();
        if !exists(&conn, "event_templates", slot.template_id.value())? {
            return Err(RepositoryError::not_found_with_context(
                format!("Template {} not found", slot.template_id),
                ErrorContext::new("insert_slot").with_entity("template"),
            ));
        }

        conn.execute(
            "INSERT INTO event_slots (template_id, slot_date, slot_time, status)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                slot.template_id.value(),
                slot.date,
                slot.time,
                slot.status.as_str(),
            ],
        )
        .map_err(|e| RepositoryError::from(e).with_operation("insert_slot"))?;

        let mut stored = slot.clone();
        stored.id = Some(SlotId(conn.last_insert_rowid()));
        Ok(stored)
    }

    async fn list_slots_for_template(
        &self,
        template_id: TemplateId,
    ) -> RepositoryResult<Vec<Slot>> {
        let conn = self.conn.lock();
        let sql = format!(
            "SELECT {} FROM event_slots WHERE template_id = ?1 ORDER BY slot_date, slot_time",
            SLOT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let slots = stmt
            .query_map(params![template_id.value()], slot_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(slots)
    }

    async fn update_slot_status(&self, id: SlotId, status: SlotStatus) -> RepositoryResult<Slot> {
        let conn = self.conn.lock();
        let changed = conn.execute(
            "UPDATE event_slots SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id.value()],
        )?;
        if changed == 0 {
            return Err(RepositoryError::not_found_with_context(
                format!("Slot {} not found", id),
                ErrorContext::new("update_slot_status")
                    .with_entity("slot")
                    .with_entity_id(id),
            ));
        }

        let sql = format!("SELECT {} FROM event_slots WHERE id = ?1", SLOT_COLUMNS);
        Ok(conn.query_row(&sql, params![id.value()], slot_from_row)?)
    }

    async fn get_slot(&self, id: SlotId) -> RepositoryResult<Slot> {
        let conn = self.conn.lock();
        let sql = format!("SELECT {} FROM event_slots WHERE id = ?1", SLOT_COLUMNS);
        conn.query_row(&sql, params![id.value()], slot_from_row)
            .optional()?
            .ok_or_else(|| slot_not_found("get_slot", id))
    }

    async fn set_slot_attendees(
        &self,
        id: SlotId,
        attendees: &[SlotAttendee],
    ) -> RepositoryResult<()> {
        let mut conn = self.conn.lock();
        if !exists(&conn, "event_slots", id.value())? {
            return Err(slot_not_found("set_slot_attendees", id));
        }
        for attendee in attendees {
            require(&conn, "contacts", "contact", attendee.contact_id.value())?;
            if let Some(family_id) = attendee.family_id {
                require(&conn, "families", "family", family_id.value())?;
            }
        }

        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM event_slot_contacts WHERE slot_id = ?1",
            params![id.value()],
        )?;
        for attendee in attendees {
            tx.execute(
                "INSERT OR IGNORE INTO event_slot_contacts (slot_id, contact_id, family_id)
                 VALUES (?1, ?2, ?3)",
                params![
                    id.value(),
                    attendee.contact_id.value(),
                    attendee.family_id.map(|f| f.value()),
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    async fn remove_slot_attendee(
        &self,
        id: SlotId,
        contact_id: ContactId,
    ) -> RepositoryResult<usize> {
        let conn = self.conn.lock();
        let removed = conn.execute(
            "DELETE FROM event_slot_contacts WHERE slot_id = ?1 AND contact_id = ?2",
            params![id.value(), contact_id.value()],
        )?;
        if removed == 0 {
            return Err(RepositoryError::not_found_with_context(
                format!("Contact {} is not assigned to slot {}", contact_id, id),
                ErrorContext::new("remove_slot_attendee")
                    .with_entity("slot")
                    .with_entity_id(id),
            ));
        }

        let remaining: i64 = conn.query_row(
            "SELECT COUNT(*) FROM event_slot_contacts WHERE slot_id = ?1",
            params![id.value()],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(remaining).unwrap_or_default())
    }

    async fn slot_attendees(&self, id: SlotId) -> RepositoryResult<Vec<SlotAttendee>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT contact_id, family_id FROM event_slot_contacts
             WHERE slot_id = ?1 ORDER BY contact_id",
        )?;
        let attendees = stmt
            .query_map(params![id.value()], |row| {
                Ok(SlotAttendee {
                    contact_id: ContactId(row.get(0)?),
                    family_id: row.get::<_, Option<i64>>(1)?.map(FamilyId),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(attendees)
    }

    async fn set_slot_groups(&self, id: SlotId, group_ids: &[GroupId]) -> RepositoryResult<()> {
        let mut conn = self.conn.lock();
        if !exists(&conn, "event_slots", id.value())? {
            return Err(slot_not_found("set_slot_groups", id));
        }
        for group_id in group_ids {
            require(&conn, "invite_groups", "group", group_id.value())?;
        }

        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM event_slot_groups WHERE slot_id = ?1",
            params![id.value()],
        )?;
        for group_id in group_ids {
            tx.execute(
                "INSERT OR IGNORE INTO event_slot_groups (slot_id, group_id) VALUES (?1, ?2)",
                params![id.value(), group_id.value()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    async fn slot_groups(&self, id: SlotId) -> RepositoryResult<Vec<GroupId>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT group_id FROM event_slot_groups WHERE slot_id = ?1 ORDER BY group_id",
        )?;
        let groups = stmt
            .query_map(params![id.value()], |row| Ok(GroupId(row.get(0)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(groups)
    }
}

// ==================== Interactions ====================

#[async_trait]
impl InteractionRepository for SqliteRepository {
    async fn store_interaction(&self, interaction: &Interaction) -> RepositoryResult<Interaction> {
        if !interaction.has_subject() {
            return Err(RepositoryError::validation(
                "Interaction must reference a contact, family or group",
            ));
        }

        let conn = self.conn.lock();
        if let Some(id) = interaction.contact_id {
            require(&conn, "contacts", "contact", id.value())?;
        }
        if let Some(id) = interaction.family_id {
            require(&conn, "families", "family", id.value())?;
        }
        if let Some(id) = interaction.group_id {
            require(&conn, "invite_groups", "group", id.value())?;
        }

        conn.execute(
            "INSERT INTO interactions
                (id, contact_id, family_id, group_id, kind, notes, interaction_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                interaction.id.map(|id| id.value()),
                interaction.contact_id.map(|id| id.value()),
                interaction.family_id.map(|id| id.value()),
                interaction.group_id.map(|id| id.value()),
                interaction.kind,
                interaction.notes,
                interaction.date,
            ],
        )
        .map_err(|e| RepositoryError::from(e).with_operation("store_interaction"))?;

        let mut stored = interaction.clone();
        stored.id = Some(InteractionId(conn.last_insert_rowid()));
        Ok(stored)
    }

    async fn contact_interactions(
        &self,
        contact_id: ContactId,
    ) -> RepositoryResult<Vec<InteractionEvent>> {
        let conn = self.conn.lock();
        query_events(
            &conn,
            "SELECT interaction_date, kind FROM interactions
             WHERE contact_id = ?1 ORDER BY interaction_date DESC",
            contact_id.value(),
        )
    }

    async fn family_interactions(
        &self,
        family_id: FamilyId,
    ) -> RepositoryResult<Vec<InteractionEvent>> {
        let conn = self.conn.lock();
        query_events(
            &conn,
            "SELECT interaction_date, kind FROM interactions
             WHERE family_id = ?1 ORDER BY interaction_date DESC",
            family_id.value(),
        )
    }

    async fn group_interactions(
        &self,
        group_id: GroupId,
    ) -> RepositoryResult<Vec<InteractionEvent>> {
        let conn = self.conn.lock();
        query_events(
            &conn,
            "SELECT interaction_date, kind FROM interactions
             WHERE group_id = ?1 ORDER BY interaction_date DESC",
            group_id.value(),
        )
    }

    async fn fallback_interactions(
        &self,
        group_id: GroupId,
    ) -> RepositoryResult<Vec<InteractionEvent>> {
        let conn = self.conn.lock();
        query_events(
            &conn,
            "SELECT i.interaction_date, i.kind FROM interactions i
             WHERE i.contact_id IN (
                     SELECT contact_id FROM invite_group_members WHERE group_id = ?1)
                OR (i.family_id IS NOT NULL
                    AND i.family_id = (SELECT family_id FROM invite_groups WHERE id = ?1))
             ORDER BY i.interaction_date DESC",
            group_id.value(),
        )
    }
}

// ==================== Directory ====================

#[async_trait]
impl DirectoryRepository for SqliteRepository {
    async fn store_contact(&self, contact: &Contact) -> RepositoryResult<Contact> {
        let conn = self.conn.lock();
        if let Some(id) = contact.family_id {
            require(&conn, "families", "family", id.value())?;
        }

        conn.execute(
            "INSERT INTO contacts (id, first_name, last_name, family_id, birthday)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                family_id = excluded.family_id,
                birthday = excluded.birthday",
            params![
                contact.id.map(|id| id.value()),
                contact.first_name,
                contact.last_name,
                contact.family_id.map(|id| id.value()),
                contact.birthday,
            ],
        )
        .map_err(|e| RepositoryError::from(e).with_operation("store_contact"))?;

        let mut stored = contact.clone();
        stored.id = Some(contact.id.unwrap_or(ContactId(conn.last_insert_rowid())));
        Ok(stored)
    }

    async fn get_contact(&self, id: ContactId) -> RepositoryResult<Contact> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, first_name, last_name, family_id, birthday FROM contacts WHERE id = ?1",
            params![id.value()],
            contact_from_row,
        )
        .optional()?
        .ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Contact {} not found", id),
                ErrorContext::new("get_contact")
                    .with_entity("contact")
                    .with_entity_id(id),
            )
        })
    }

    async fn list_contacts(&self) -> RepositoryResult<Vec<Contact>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, first_name, last_name, family_id, birthday FROM contacts ORDER BY id",
        )?;
        let contacts = stmt
            .query_map([], contact_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(contacts)
    }

    async fn store_family(&self, family: &Family) -> RepositoryResult<Family> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO families (id, name) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
            params![family.id.map(|id| id.value()), family.name],
        )
        .map_err(|e| RepositoryError::from(e).with_operation("store_family"))?;

        let mut stored = family.clone();
        stored.id = Some(family.id.unwrap_or(FamilyId(conn.last_insert_rowid())));
        Ok(stored)
    }

    async fn get_family(&self, id: FamilyId) -> RepositoryResult<Family> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT id, name FROM families WHERE id = ?1",
            params![id.value()],
            |row| {
                Ok(Family {
                    id: Some(FamilyId(row.get(0)?)),
                    name: row.get(1)?,
                })
            },
        )
        .optional()?
        .ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Family {} not found", id),
                ErrorContext::new("get_family")
                    .with_entity("family")
                    .with_entity_id(id),
            )
        })
    }

    async fn store_group(&self, group: &InviteGroup) -> RepositoryResult<InviteGroup> {
        let mut conn = self.conn.lock();
        if let Some(id) = group.family_id {
            require(&conn, "families", "family", id.value())?;
        }
        for member in &group.member_ids {
            require(&conn, "contacts", "member contact", member.value())?;
        }

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO invite_groups (id, name, family_id) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, family_id = excluded.family_id",
            params![
                group.id.map(|id| id.value()),
                group.name,
                group.family_id.map(|id| id.value()),
            ],
        )
        .map_err(|e| RepositoryError::from(e).with_operation("store_group"))?;
        let id = group.id.unwrap_or(GroupId(tx.last_insert_rowid()));

        tx.execute(
            "DELETE FROM invite_group_members WHERE group_id = ?1",
            params![id.value()],
        )?;
        for member in &group.member_ids {
            tx.execute(
                "INSERT OR IGNORE INTO invite_group_members (group_id, contact_id)
                 VALUES (?1, ?2)",
                params![id.value(), member.value()],
            )?;
        }
        tx.commit()?;

        let mut stored = group.clone();
        stored.id = Some(id);
        stored.member_ids.sort();
        stored.member_ids.dedup();
        Ok(stored)
    }

    async fn get_group(&self, id: GroupId) -> RepositoryResult<InviteGroup> {
        let conn = self.conn.lock();
        load_group(&conn, id)?.ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("Group {} not found", id),
                ErrorContext::new("get_group")
                    .with_entity("group")
                    .with_entity_id(id),
            )
        })
    }

    async fn list_groups(&self) -> RepositoryResult<Vec<InviteGroup>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT id FROM invite_groups ORDER BY name, id")?;
        let ids = stmt
            .query_map([], |row| Ok(GroupId(row.get(0)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut groups = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(group) = load_group(&conn, id)? {
                groups.push(group);
            }
        }
        Ok(groups)
    }

    async fn last_interaction_dates(&self) -> RepositoryResult<Vec<ContactActivity>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT c.id, c.first_name, c.last_name, MAX(i.interaction_date)
             FROM contacts c
             LEFT JOIN interactions i ON i.contact_id = c.id
             GROUP BY c.id
             ORDER BY c.id",
        )?;
        let rows = stmt
            .query_map([], |row| {
                let first: String = row.get(1)?;
                let last: String = row.get(2)?;
                Ok(ContactActivity {
                    contact_id: ContactId(row.get(0)?),
                    name: Contact::new(first, last).display_name(),
                    last_interaction: row.get::<_, Option<NaiveDate>>(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }
}

// ==================== Reminders ====================

#[async_trait]
impl ReminderRepository for SqliteRepository {
    async fn store_reminder(&self, reminder: &Reminder) -> RepositoryResult<Reminder> {
        let mut conn = self.conn.lock();
        for id in &reminder.contact_ids {
            require(&conn, "contacts", "contact", id.value())?;
        }
        for id in &reminder.family_ids {
            require(&conn, "families", "family", id.value())?;
        }

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO reminders
                (id, kind, title, description, due_date, repeat_interval, completed, completed_on)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO UPDATE SET
                kind = excluded.kind,
                title = excluded.title,
                description = excluded.description,
                due_date = excluded.due_date,
                repeat_interval = excluded.repeat_interval,
                completed = excluded.completed,
                completed_on = excluded.completed_on",
            params![
                reminder.id.map(|id| id.value()),
                reminder.kind.as_str(),
                reminder.title,
                reminder.description,
                reminder.due_date,
                reminder.repeat.as_str(),
                reminder.completed,
                reminder.completed_on,
            ],
        )
        .map_err(|e| RepositoryError::from(e).with_operation("store_reminder"))?;
        let id = reminder.id.unwrap_or(ReminderId(tx.last_insert_rowid()));

        tx.execute(
            "DELETE FROM reminder_contacts WHERE reminder_id = ?1",
            params![id.value()],
        )?;
        tx.execute(
            "DELETE FROM reminder_families WHERE reminder_id = ?1",
            params![id.value()],
        )?;
        for contact_id in &reminder.contact_ids {
            tx.execute(
                "INSERT OR IGNORE INTO reminder_contacts (reminder_id, contact_id)
                 VALUES (?1, ?2)",
                params![id.value(), contact_id.value()],
            )?;
        }
        for family_id in &reminder.family_ids {
            tx.execute(
                "INSERT OR IGNORE INTO reminder_families (reminder_id, family_id)
                 VALUES (?1, ?2)",
                params![id.value(), family_id.value()],
            )?;
        }
        tx.commit()?;

        let mut stored = reminder.clone();
        stored.id = Some(id);
        stored.contact_ids.sort();
        stored.contact_ids.dedup();
        stored.family_ids.sort();
        stored.family_ids.dedup();
        Ok(stored)
    }

    async fn get_reminder(&self, id: ReminderId) -> RepositoryResult<Reminder> {
        let conn = self.conn.lock();
        let sql = format!("SELECT {} FROM reminders WHERE id = ?1", REMINDER_COLUMNS);
        let mut reminder = conn
            .query_row(&sql, params![id.value()], reminder_from_row)
            .optional()?
            .ok_or_else(|| reminder_not_found("get_reminder", id))?;
        load_reminder_links(&conn, &mut reminder)?;
        Ok(reminder)
    }

    async fn delete_reminder(&self, id: ReminderId) -> RepositoryResult<()> {
        let conn = self.conn.lock();
        let removed = conn.execute("DELETE FROM reminders WHERE id = ?1", params![id.value()])?;
        if removed == 0 {
            return Err(reminder_not_found("delete_reminder", id));
        }
        Ok(())
    }

    async fn list_open_reminders(&self) -> RepositoryResult<Vec<Reminder>> {
        let conn = self.conn.lock();
        let sql = format!(
            "SELECT {} FROM reminders WHERE completed = 0 ORDER BY due_date, id",
            REMINDER_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut reminders = stmt
            .query_map([], reminder_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for reminder in &mut reminders {
            load_reminder_links(&conn, reminder)?;
        }
        Ok(reminders)
    }
}
