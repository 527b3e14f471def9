use anyhow::anyhow;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{
    AvailabilitySlot, Booking, BookingStatus, DayOfWeek, Rating, Role, TherapistStatus, User,
};

// ── Users ──

pub fn create_user(conn: &Connection, user: &User) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO users (id, name, email, phone, password_hash, role, specialty, license_number, years_of_experience, session_fee, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            user.id,
            user.name,
            user.email,
            user.phone,
            user.password_hash,
            user.role.as_str(),
            user.specialty,
            user.license_number,
            user.years_of_experience,
            user.session_fee,
            user.status.as_str(),
        ],
    )?;
    Ok(())
}

const USER_COLUMNS: &str = "id, name, email, phone, password_hash, role, specialty, license_number, years_of_experience, session_fee, status";

pub fn get_user_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        params![id],
        |row| Ok(parse_user_row(row)),
    );

    match result {
        Ok(user) => Ok(Some(user?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
        params![email],
        |row| Ok(parse_user_row(row)),
    );

    match result {
        Ok(user) => Ok(Some(user?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_pending_therapists(conn: &Connection) -> anyhow::Result<Vec<User>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE role = 'therapist' AND status = 'pending' ORDER BY created_at ASC"
    ))?;

    let rows = stmt.query_map([], |row| Ok(parse_user_row(row)))?;

    let mut users = vec![];
    for row in rows {
        users.push(row??);
    }
    Ok(users)
}

/// Updates a therapist's status. Returns false when no therapist matches.
pub fn set_therapist_status(
    conn: &Connection,
    id: &str,
    status: TherapistStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE users SET status = ?1, updated_at = datetime('now') WHERE id = ?2 AND role = 'therapist'",
        params![status.as_str(), id],
    )?;
    Ok(count > 0)
}

pub fn get_session_fee(conn: &Connection, therapist_id: &str) -> anyhow::Result<Option<Option<f64>>> {
    let result = conn.query_row(
        "SELECT session_fee FROM users WHERE id = ?1 AND role = 'therapist'",
        params![therapist_id],
        |row| row.get::<_, Option<f64>>(0),
    );

    match result {
        Ok(fee) => Ok(Some(fee)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_user_row(row: &rusqlite::Row) -> anyhow::Result<User> {
    let role_str: String = row.get(5)?;
    let status_str: String = row.get(10)?;

    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        password_hash: row.get(4)?,
        role: Role::parse(&role_str).ok_or_else(|| anyhow!("unknown role in store: {role_str}"))?,
        specialty: row.get(6)?,
        license_number: row.get(7)?,
        years_of_experience: row.get(8)?,
        session_fee: row.get(9)?,
        status: TherapistStatus::parse(&status_str),
    })
}

// ── Availability ──

pub fn get_availability(conn: &Connection, therapist_id: &str) -> anyhow::Result<Vec<AvailabilitySlot>> {
    let mut stmt = conn.prepare(
        "SELECT id, therapist_id, day_of_week, is_weekday, start_time, end_time, is_available
         FROM availability WHERE therapist_id = ?1 ORDER BY start_time ASC",
    )?;

    let rows = stmt.query_map(params![therapist_id], |row| Ok(parse_slot_row(row)))?;

    let mut slots = vec![];
    for row in rows {
        slots.push(row??);
    }
    Ok(slots)
}

/// Replaces the therapist's whole weekly template in one transaction.
pub fn replace_availability(
    conn: &Connection,
    therapist_id: &str,
    slots: &[AvailabilitySlot],
) -> anyhow::Result<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute(
        "DELETE FROM availability WHERE therapist_id = ?1",
        params![therapist_id],
    )?;

    for slot in slots {
        tx.execute(
            "INSERT INTO availability (id, therapist_id, day_of_week, is_weekday, start_time, end_time, is_available)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                slot.id,
                therapist_id,
                slot.day_of_week.as_str(),
                slot.is_weekday as i32,
                slot.start_time,
                slot.end_time,
                slot.is_available as i32,
            ],
        )?;
    }

    tx.commit()?;
    Ok(())
}

pub fn get_availability_slot(conn: &Connection, id: &str) -> anyhow::Result<Option<AvailabilitySlot>> {
    let result = conn.query_row(
        "SELECT id, therapist_id, day_of_week, is_weekday, start_time, end_time, is_available
         FROM availability WHERE id = ?1",
        params![id],
        |row| Ok(parse_slot_row(row)),
    );

    match result {
        Ok(slot) => Ok(Some(slot?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn parse_slot_row(row: &rusqlite::Row) -> anyhow::Result<AvailabilitySlot> {
    let day_str: String = row.get(2)?;

    Ok(AvailabilitySlot {
        id: row.get(0)?,
        therapist_id: row.get(1)?,
        day_of_week: DayOfWeek::parse(&day_str)
            .ok_or_else(|| anyhow!("unknown day of week in store: {day_str}"))?,
        is_weekday: row.get::<_, i32>(3)? != 0,
        start_time: row.get(4)?,
        end_time: row.get(5)?,
        is_available: row.get::<_, i32>(6)? != 0,
    })
}

// ── Bookings ──

pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, therapist_id, customer_id, availability_id, booking_date, start_time, end_time, session_type, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            booking.id,
            booking.therapist_id,
            booking.customer_id,
            booking.availability_id,
            booking.booking_date.format("%Y-%m-%d").to_string(),
            booking.start_time,
            booking.end_time,
            booking.session_type,
            booking.status.as_str(),
            booking.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

/// Start times (`HH:MM:SS`) already held by active bookings for one
/// therapist on one calendar date.
pub fn booked_start_times(
    conn: &Connection,
    therapist_id: &str,
    date: NaiveDate,
) -> anyhow::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT start_time FROM bookings
         WHERE therapist_id = ?1 AND booking_date = ?2 AND status != 'cancelled'
         ORDER BY start_time ASC",
    )?;

    let date_str = date.format("%Y-%m-%d").to_string();
    let rows = stmt.query_map(params![therapist_id, date_str], |row| row.get(0))?;

    let mut times = vec![];
    for row in rows {
        times.push(row?);
    }
    Ok(times)
}

pub fn has_active_booking(
    conn: &Connection,
    therapist_id: &str,
    date: NaiveDate,
    start_time: &str,
) -> anyhow::Result<bool> {
    let date_str = date.format("%Y-%m-%d").to_string();
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM bookings
         WHERE therapist_id = ?1 AND booking_date = ?2 AND start_time = ?3 AND status != 'cancelled'",
        params![therapist_id, date_str, start_time],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        "SELECT id, therapist_id, customer_id, availability_id, booking_date, start_time, end_time, session_type, status, created_at
         FROM bookings WHERE id = ?1",
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Bookings where the user participates on either side.
pub fn bookings_for_user(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(
        "SELECT id, therapist_id, customer_id, availability_id, booking_date, start_time, end_time, session_type, status, created_at
         FROM bookings WHERE therapist_id = ?1 OR customer_id = ?1
         ORDER BY booking_date ASC, start_time ASC",
    )?;

    let rows = stmt.query_map(params![user_id], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn cancel_booking(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = 'cancelled' WHERE id = ?1 AND status != 'cancelled'",
        params![id],
    )?;
    Ok(count > 0)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let date_str: String = row.get(4)?;
    let status_str: String = row.get(8)?;
    let created_at_str: String = row.get(9)?;

    let booking_date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|e| anyhow!("bad booking_date {date_str}: {e}"))?;
    let created_at = NaiveDateTime::parse_from_str(&created_at_str, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|_| Utc::now().naive_utc());

    Ok(Booking {
        id: row.get(0)?,
        therapist_id: row.get(1)?,
        customer_id: row.get(2)?,
        availability_id: row.get(3)?,
        booking_date,
        start_time: row.get(5)?,
        end_time: row.get(6)?,
        session_type: row.get(7)?,
        status: BookingStatus::parse(&status_str),
        created_at,
    })
}

// ── Ratings ──

pub fn create_rating(conn: &Connection, rating: &Rating) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO ratings (id, booking_id, customer_id, score, comment, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            rating.id,
            rating.booking_id,
            rating.customer_id,
            rating.score,
            rating.comment,
            rating.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ],
    )?;
    Ok(())
}

pub fn ratings_for_therapist(conn: &Connection, therapist_id: &str) -> anyhow::Result<Vec<Rating>> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.booking_id, r.customer_id, r.score, r.comment, r.created_at
         FROM ratings r
         INNER JOIN bookings b ON r.booking_id = b.id
         WHERE b.therapist_id = ?1
         ORDER BY r.created_at DESC",
    )?;

    let rows = stmt.query_map(params![therapist_id], |row| {
        let created_at_str: String = row.get(5)?;
        Ok(Rating {
            id: row.get(0)?,
            booking_id: row.get(1)?,
            customer_id: row.get(2)?,
            score: row.get(3)?,
            comment: row.get(4)?,
            created_at: NaiveDateTime::parse_from_str(&created_at_str, "%Y-%m-%d %H:%M:%S")
                .unwrap_or_else(|_| Utc::now().naive_utc()),
        })
    })?;

    let mut ratings = vec![];
    for row in rows {
        ratings.push(row?);
    }
    Ok(ratings)
}

// ── Auth Tokens ──

pub fn insert_token(conn: &Connection, token: &str, user_id: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO auth_tokens (token, user_id) VALUES (?1, ?2)",
        params![token, user_id],
    )?;
    Ok(())
}

pub fn user_for_token(conn: &Connection, token: &str) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        "SELECT u.id, u.name, u.email, u.phone, u.password_hash, u.role, u.specialty, u.license_number, u.years_of_experience, u.session_fee, u.status
         FROM auth_tokens t INNER JOIN users u ON t.user_id = u.id
         WHERE t.token = ?1",
        params![token],
        |row| Ok(parse_user_row(row)),
    );

    match result {
        Ok(user) => Ok(Some(user?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn delete_token(conn: &Connection, token: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM auth_tokens WHERE token = ?1", params![token])?;
    Ok(count > 0)
}
