use super::Database;

use sqlx::sqlite::SqliteRow;
use sqlx::{types::Json, Row, Transaction};
use uuid::Uuid;

use crate::entities::{
    meets_requirements, Category, Document, DocumentStatus, Driver, Negotiation, NegotiationStatus,
    Offer, OfferStatus, Order, Party, Passenger,
};
use crate::error::{conflict, not_found, validation, Error};

#[tracing::instrument(skip(tx))]
pub async fn fetch_passenger_by_handle(
    tx: &mut Transaction<'_, Database>,
    handle: &str,
) -> Result<Passenger, Error> {
    let Json(passenger) = sqlx::query("SELECT data FROM passengers WHERE handle = ?")
        .bind(handle)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| not_found("passenger"))?
        .try_get("data")?;

    Ok(passenger)
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_driver_by_handle(
    tx: &mut Transaction<'_, Database>,
    handle: &str,
) -> Result<Driver, Error> {
    let Json(driver) = sqlx::query("SELECT data FROM drivers WHERE handle = ?")
        .bind(handle)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| not_found("driver"))?
        .try_get("data")?;

    Ok(driver)
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_passenger(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<Passenger, Error> {
    let Json(passenger) = sqlx::query("SELECT data FROM passengers WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| not_found("passenger"))?
        .try_get("data")?;

    Ok(passenger)
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_driver(tx: &mut Transaction<'_, Database>, id: &Uuid) -> Result<Driver, Error> {
    let Json(driver) = sqlx::query("SELECT data FROM drivers WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| not_found("driver"))?
        .try_get("data")?;

    Ok(driver)
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_order(tx: &mut Transaction<'_, Database>, id: &Uuid) -> Result<Order, Error> {
    let Json(order) = sqlx::query("SELECT data FROM orders WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| not_found("order"))?
        .try_get("data")?;

    Ok(order)
}

#[tracing::instrument(skip(tx, order))]
pub async fn update_order(tx: &mut Transaction<'_, Database>, order: &Order) -> Result<(), Error> {
    sqlx::query("UPDATE orders SET status = ?, data = ? WHERE id = ?")
        .bind(order.status.name())
        .bind(Json(order))
        .bind(&order.id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

#[tracing::instrument(skip(tx, driver))]
pub async fn update_driver(
    tx: &mut Transaction<'_, Database>,
    driver: &Driver,
) -> Result<(), Error> {
    sqlx::query("UPDATE drivers SET data = ? WHERE id = ?")
        .bind(Json(driver))
        .bind(&driver.id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

#[tracing::instrument(skip(tx, passenger))]
pub async fn update_passenger(
    tx: &mut Transaction<'_, Database>,
    passenger: &Passenger,
) -> Result<(), Error> {
    sqlx::query("UPDATE passengers SET data = ? WHERE id = ?")
        .bind(Json(passenger))
        .bind(&passenger.id)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

pub fn row_to_offer(row: &SqliteRow) -> Result<Offer, Error> {
    let status: String = row.try_get("status")?;

    Ok(Offer {
        id: row.try_get("id")?,
        order_id: row.try_get("order_id")?,
        driver_id: row.try_get("driver_id")?,
        price: row.try_get("price")?,
        note: row.try_get("note")?,
        status: OfferStatus::parse(&status)
            .ok_or_else(|| validation("unrecognized offer status"))?,
        created_at: row.try_get("created_at")?,
    })
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_offer(tx: &mut Transaction<'_, Database>, id: &Uuid) -> Result<Offer, Error> {
    let row = sqlx::query(
        "SELECT id, order_id, driver_id, price, note, status, created_at
         FROM driver_offers WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| not_found("offer"))?;

    row_to_offer(&row)
}

pub fn row_to_negotiation(row: &SqliteRow) -> Result<Negotiation, Error> {
    let from_party: String = row.try_get("from_party")?;
    let status: String = row.try_get("status")?;

    Ok(Negotiation {
        id: row.try_get("id")?,
        order_id: row.try_get("order_id")?,
        from_user_id: row.try_get("from_user_id")?,
        from_party: Party::parse(&from_party)
            .ok_or_else(|| validation("unrecognized negotiation party"))?,
        to_user_id: row.try_get("to_user_id")?,
        price: row.try_get("price")?,
        status: NegotiationStatus::parse(&status)
            .ok_or_else(|| validation("unrecognized negotiation status"))?,
        created_at: row.try_get("created_at")?,
    })
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_negotiation(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<Negotiation, Error> {
    let row = sqlx::query(
        "SELECT id, order_id, from_user_id, from_party, to_user_id, price, status, created_at
         FROM negotiations WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| not_found("negotiation"))?;

    row_to_negotiation(&row)
}

pub fn row_to_document(row: &SqliteRow) -> Result<Document, Error> {
    let category: String = row.try_get("category")?;
    let status: String = row.try_get("status")?;

    Ok(Document {
        id: row.try_get("id")?,
        driver_id: row.try_get("driver_id")?,
        category: Category::parse(&category)
            .ok_or_else(|| validation("unrecognized document category"))?,
        payload: row.try_get("payload")?,
        status: DocumentStatus::parse(&status)
            .ok_or_else(|| validation("unrecognized document status"))?,
        reason: row.try_get("reason")?,
        submitted_at: row.try_get("submitted_at")?,
    })
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_document(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<Document, Error> {
    let row = sqlx::query(
        "SELECT id, driver_id, category, payload, status, reason, submitted_at
         FROM driver_documents WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| not_found("document"))?;

    row_to_document(&row)
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_documents_for_driver(
    tx: &mut Transaction<'_, Database>,
    driver_id: &Uuid,
) -> Result<Vec<Document>, Error> {
    let rows = sqlx::query(
        "SELECT id, driver_id, category, payload, status, reason, submitted_at
         FROM driver_documents WHERE driver_id = ? ORDER BY submitted_at ASC",
    )
    .bind(driver_id)
    .fetch_all(&mut **tx)
    .await?;

    rows.iter().map(row_to_document).collect()
}

/// Re-derives the aggregate verified flag from the document rows and writes it
/// back to the driver profile. Runs on every document status change, so a
/// rejection or resubmission can flip a previously verified driver back.
#[tracing::instrument(skip(tx))]
pub async fn recompute_driver_verification(
    tx: &mut Transaction<'_, Database>,
    driver_id: &Uuid,
) -> Result<bool, Error> {
    let documents = fetch_documents_for_driver(tx, driver_id).await?;
    let verified = meets_requirements(&documents);

    let mut driver = fetch_driver(tx, driver_id).await?;

    if driver.verified != verified {
        driver.verified = verified;
        update_driver(tx, &driver).await?;
    }

    Ok(verified)
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Maps a unique-constraint violation onto the marketplace conflict it guards.
pub fn unique_conflict(err: sqlx::Error, message: &str) -> Error {
    if is_unique_violation(&err) {
        conflict(message)
    } else {
        Error::Database(err)
    }
}
