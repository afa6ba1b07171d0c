use chrono::{Duration, NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::services::session::WizardSession;

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn now_str() -> String {
    Utc::now().naive_utc().format(TS_FORMAT).to_string()
}

// ── Wizard sessions ──

/// Inserts or replaces a session and pushes its expiry `ttl_minutes` ahead.
pub fn save_session(
    conn: &Connection,
    session: &WizardSession,
    ttl_minutes: i64,
) -> anyhow::Result<()> {
    let data = serde_json::to_string(session)?;
    let now = Utc::now().naive_utc();
    let now_str = now.format(TS_FORMAT).to_string();
    let expires_at = (now + Duration::minutes(ttl_minutes))
        .format(TS_FORMAT)
        .to_string();

    conn.execute(
        "INSERT INTO wizard_sessions (id, car_id, step, data, created_at, updated_at, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
           step = excluded.step,
           data = excluded.data,
           updated_at = excluded.updated_at,
           expires_at = excluded.expires_at",
        params![
            session.id,
            session.state.car_id,
            session.wizard.step.number(),
            data,
            now_str,
            expires_at,
        ],
    )?;
    Ok(())
}

pub fn get_session(conn: &Connection, id: &str) -> anyhow::Result<Option<WizardSession>> {
    let result = conn.query_row(
        "SELECT data FROM wizard_sessions WHERE id = ?1 AND expires_at > ?2",
        params![id, now_str()],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(data) => Ok(Some(serde_json::from_str(&data)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn delete_session(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM wizard_sessions WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn expire_old_sessions(conn: &Connection) -> anyhow::Result<usize> {
    let count = conn.execute(
        "DELETE FROM wizard_sessions WHERE expires_at <= ?1",
        params![now_str()],
    )?;
    Ok(count)
}

pub fn session_expiry(conn: &Connection, id: &str) -> anyhow::Result<Option<NaiveDateTime>> {
    let result = conn.query_row(
        "SELECT expires_at FROM wizard_sessions WHERE id = ?1",
        params![id],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(s) => Ok(Some(NaiveDateTime::parse_from_str(&s, TS_FORMAT)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::services::booking_state::SeedParams;

    fn setup_db() -> Connection {
        db::init_db(":memory:").unwrap()
    }

    fn session(id: &str) -> WizardSession {
        WizardSession::new(
            id.to_string(),
            "user-1".to_string(),
            SeedParams {
                car_id: "car-1".to_string(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_save_and_load_session() {
        let conn = setup_db();
        let s = session("s-1");
        save_session(&conn, &s, 30).unwrap();

        let loaded = get_session(&conn, "s-1").unwrap().unwrap();
        assert_eq!(loaded, s);
        assert!(get_session(&conn, "missing").unwrap().is_none());
    }

    #[test]
    fn test_save_overwrites_existing() {
        let conn = setup_db();
        let mut s = session("s-2");
        save_session(&conn, &s, 30).unwrap();

        s.wizard.next(None);
        save_session(&conn, &s, 30).unwrap();

        let loaded = get_session(&conn, "s-2").unwrap().unwrap();
        assert_eq!(loaded.wizard.step.number(), 2);
    }

    #[test]
    fn test_expired_sessions_are_hidden_and_swept() {
        let conn = setup_db();
        save_session(&conn, &session("old"), -5).unwrap();
        save_session(&conn, &session("fresh"), 30).unwrap();

        assert!(get_session(&conn, "old").unwrap().is_none());
        assert_eq!(expire_old_sessions(&conn).unwrap(), 1);
        assert!(get_session(&conn, "fresh").unwrap().is_some());
        assert!(session_expiry(&conn, "old").unwrap().is_none());
    }

    #[test]
    fn test_delete_session() {
        let conn = setup_db();
        save_session(&conn, &session("s-3"), 30).unwrap();
        assert!(delete_session(&conn, "s-3").unwrap());
        assert!(!delete_session(&conn, "s-3").unwrap());
    }

    #[test]
    fn test_save_extends_expiry() {
        let conn = setup_db();
        let s = session("s-4");
        save_session(&conn, &s, 1).unwrap();
        let first = session_expiry(&conn, "s-4").unwrap().unwrap();
        save_session(&conn, &s, 120).unwrap();
        let second = session_expiry(&conn, "s-4").unwrap().unwrap();
        assert!(second > first);
    }
}
