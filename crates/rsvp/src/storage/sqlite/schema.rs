//! SQLite schema definitions and SQL query constants.
//!
//! Pure data, no I/O.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS friends (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    preferences TEXT NOT NULL DEFAULT '{}'
);

-- start_time is the Unix timestamp of the slot; invited is a JSON array of emails
CREATE TABLE IF NOT EXISTS fridays (
    start_time INTEGER PRIMARY KEY,
    invited_group TEXT,
    details TEXT,
    invited TEXT NOT NULL DEFAULT '[]',
    max_guests INTEGER NOT NULL DEFAULT 10,
    enabled INTEGER NOT NULL DEFAULT 1
);
"#;

// Friend queries
pub const UPSERT_FRIEND: &str = r#"
INSERT INTO friends (email, name)
VALUES (?1, ?2)
ON CONFLICT(email) DO UPDATE SET name = excluded.name
"#;

pub const SELECT_FRIEND_BY_EMAIL: &str = r#"
SELECT id, email, name, preferences
FROM friends
WHERE email = ?1
"#;

pub const SELECT_FRIEND_BY_ID: &str = r#"
SELECT id, email, name, preferences
FROM friends
WHERE id = ?1
"#;

pub const SELECT_ALL_FRIENDS: &str = r#"
SELECT id, email, name, preferences
FROM friends
ORDER BY email ASC
"#;

pub const DELETE_FRIEND: &str = r#"
DELETE FROM friends
WHERE email = ?1
"#;

pub const SELECT_PREFERENCES: &str = r#"
SELECT preferences
FROM friends
WHERE email = ?1
"#;

pub const UPDATE_PREFERENCES: &str = r#"
UPDATE friends
SET preferences = ?2
WHERE email = ?1
"#;

// Friday queries
pub const INSERT_FRIDAY: &str = r#"
INSERT OR IGNORE INTO fridays (start_time, invited_group, details, max_guests, enabled)
VALUES (?1, ?2, ?3, ?4, ?5)
"#;

pub const SELECT_FRIDAY: &str = r#"
SELECT start_time, invited_group, details, invited, max_guests, enabled
FROM fridays
WHERE start_time = ?1
"#;

pub const SELECT_FRIDAYS_BETWEEN: &str = r#"
SELECT start_time, invited_group, details, invited, max_guests, enabled
FROM fridays
WHERE start_time >= ?1 AND start_time <= ?2
ORDER BY start_time ASC
"#;

pub const SELECT_ALL_FRIDAYS: &str = r#"
SELECT start_time, invited_group, details, invited, max_guests, enabled
FROM fridays
ORDER BY start_time ASC
"#;

pub const FRIDAY_EXISTS: &str = r#"
SELECT EXISTS(SELECT 1 FROM fridays WHERE start_time = ?1)
"#;

pub const UPDATE_FRIDAY: &str = r#"
UPDATE fridays
SET invited_group = ?2, details = ?3, max_guests = ?4, enabled = ?5
WHERE start_time = ?1
"#;

pub const DELETE_FRIDAY: &str = r#"
DELETE FROM fridays
WHERE start_time = ?1
"#;

// Guest list mutations. Each is one statement so the row update is atomic.

/// Appends ?1 to the guest list of ?2 unless present or at capacity.
pub const APPEND_GUEST: &str = r#"
UPDATE fridays
SET invited = json_insert(invited, '$[#]', ?1)
WHERE start_time = ?2
  AND NOT EXISTS (SELECT 1 FROM json_each(fridays.invited) WHERE json_each.value = ?1)
  AND json_array_length(invited) < max_guests
"#;

/// Explains why [`APPEND_GUEST`] touched no row: (already present, guest count, capacity).
pub const GUEST_STATE: &str = r#"
SELECT
    EXISTS (SELECT 1 FROM json_each(fridays.invited) WHERE json_each.value = ?1),
    json_array_length(invited),
    max_guests
FROM fridays
WHERE start_time = ?2
"#;

/// Removes the first occurrence of ?1 from the guest list of ?2.
pub const REMOVE_GUEST: &str = r#"
UPDATE fridays
SET invited = json_remove(
    invited,
    (SELECT '$[' || json_each.key || ']' FROM json_each(fridays.invited) WHERE json_each.value = ?1 LIMIT 1)
)
WHERE start_time = ?2
  AND EXISTS (SELECT 1 FROM json_each(fridays.invited) WHERE json_each.value = ?1)
"#;
