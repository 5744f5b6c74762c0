// Schema for the local-first SQLite store.
// Every statement is idempotent; new tables or columns go at the end.

use log::info;
use rusqlite::Connection;

use crate::db::repository::RepositoryResult;

pub(crate) fn run_migrations(conn: &Connection) -> RepositoryResult<()> {
    conn.execute_batch(
        "
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS event_templates (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            description TEXT,
            category TEXT,
            recurrence_type TEXT NOT NULL,
            interval INTEGER NOT NULL DEFAULT 1,
            day_of_week INTEGER,
            day_of_month INTEGER,
            week_of_month INTEGER,
            time_of_day TEXT,
            max_attendees INTEGER NOT NULL DEFAULT 1,
            active INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS event_slots (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            template_id INTEGER NOT NULL,
            slot_date TEXT NOT NULL,
            slot_time TEXT,
            status TEXT NOT NULL DEFAULT 'available',
            FOREIGN KEY (template_id) REFERENCES event_templates(id) ON DELETE CASCADE
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_event_slots_template_date
            ON event_slots(template_id, slot_date);

        CREATE TABLE IF NOT EXISTS families (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS contacts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL DEFAULT '',
            family_id INTEGER,
            birthday TEXT,
            FOREIGN KEY (family_id) REFERENCES families(id) ON DELETE SET NULL
        );

        CREATE TABLE IF NOT EXISTS invite_groups (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            family_id INTEGER,
            FOREIGN KEY (family_id) REFERENCES families(id) ON DELETE SET NULL
        );

        CREATE TABLE IF NOT EXISTS invite_group_members (
            group_id INTEGER NOT NULL,
            contact_id INTEGER NOT NULL,
            PRIMARY KEY (group_id, contact_id),
            FOREIGN KEY (group_id) REFERENCES invite_groups(id) ON DELETE CASCADE,
            FOREIGN KEY (contact_id) REFERENCES contacts(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS interactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            contact_id INTEGER,
            family_id INTEGER,
            group_id INTEGER,
            kind TEXT NOT NULL,
            notes TEXT,
            interaction_date TEXT NOT NULL,
            FOREIGN KEY (contact_id) REFERENCES contacts(id) ON DELETE CASCADE,
            FOREIGN KEY (family_id) REFERENCES families(id) ON DELETE CASCADE,
            FOREIGN KEY (group_id) REFERENCES invite_groups(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_interactions_contact
            ON interactions(contact_id, interaction_date);
        CREATE INDEX IF NOT EXISTS idx_interactions_family
            ON interactions(family_id, interaction_date);
        CREATE INDEX IF NOT EXISTS idx_interactions_group
            ON interactions(group_id, interaction_date);

        CREATE TABLE IF NOT EXISTS event_slot_contacts (
            slot_id INTEGER NOT NULL,
            contact_id INTEGER NOT NULL,
            family_id INTEGER,
            PRIMARY KEY (slot_id, contact_id),
            FOREIGN KEY (slot_id) REFERENCES event_slots(id) ON DELETE CASCADE,
            FOREIGN KEY (contact_id) REFERENCES contacts(id) ON DELETE CASCADE,
            FOREIGN KEY (family_id) REFERENCES families(id) ON DELETE SET NULL
        );

        CREATE TABLE IF NOT EXISTS event_slot_groups (
            slot_id INTEGER NOT NULL,
            group_id INTEGER NOT NULL,
            PRIMARY KEY (slot_id, group_id),
            FOREIGN KEY (slot_id) REFERENCES event_slots(id) ON DELETE CASCADE,
            FOREIGN KEY (group_id) REFERENCES invite_groups(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS reminders (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL DEFAULT 'custom',
            title TEXT NOT NULL,
            description TEXT,
            due_date TEXT NOT NULL,
            repeat_interval TEXT NOT NULL DEFAULT 'none',
            completed INTEGER NOT NULL DEFAULT 0,
            completed_on TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_reminders_open
            ON reminders(completed, due_date);

        CREATE TABLE IF NOT EXISTS reminder_contacts (
            reminder_id INTEGER NOT NULL,
            contact_id INTEGER NOT NULL,
            PRIMARY KEY (reminder_id, contact_id),
            FOREIGN KEY (reminder_id) REFERENCES reminders(id) ON DELETE CASCADE,
            FOREIGN KEY (contact_id) REFERENCES contacts(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS reminder_families (
            reminder_id INTEGER NOT NULL,
            family_id INTEGER NOT NULL,
            PRIMARY KEY (reminder_id, family_id),
            FOREIGN KEY (reminder_id) REFERENCES reminders(id) ON DELETE CASCADE,
            FOREIGN KEY (family_id) REFERENCES families(id) ON DELETE CASCADE
        );
        ",
    )?;

    info!("SQLite schema ready");
    Ok(())
}
