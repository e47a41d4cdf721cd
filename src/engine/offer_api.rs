use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::Row;
use uuid::Uuid;

use super::helpers::{
    fetch_driver_by_handle, fetch_negotiation, fetch_order, fetch_passenger_by_handle,
    row_to_offer, unique_conflict,
};
use super::Engine;

use crate::api::{OfferApi, OfferView};
use crate::entities::{
    default_rating, Driver, Negotiation, NegotiationStatus, Offer, Party,
};
use crate::error::{conflict, policy_denied, Error};

#[async_trait]
impl OfferApi for Engine {
    #[tracing::instrument(skip(self))]
    async fn make_offer(
        &self,
        driver_handle: String,
        order_id: Uuid,
        price: i64,
        note: Option<String>,
    ) -> Result<Offer, Error> {
        let mut tx = self.pool.begin().await?;

        let driver = fetch_driver_by_handle(&mut tx, &driver_handle).await?;

        if !driver.verified {
            return Err(policy_denied("driver is not verified"));
        }

        let order = fetch_order(&mut tx, &order_id).await?;

        // pre-check; the unique constraint on (order_id, driver_id) is the
        // authoritative guard against a racing double-submit
        let existing = sqlx::query("SELECT 1 FROM driver_offers WHERE order_id = ? AND driver_id = ?")
            .bind(&order.id)
            .bind(&driver.id)
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_some() {
            return Err(conflict("driver already has an offer on this order"));
        }

        let offer = Offer::new(order.id, driver.id, price, note);

        sqlx::query(
            "INSERT INTO driver_offers (id, order_id, driver_id, price, note, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&offer.id)
        .bind(&offer.order_id)
        .bind(&offer.driver_id)
        .bind(&offer.price)
        .bind(&offer.note)
        .bind(offer.status.name())
        .bind(&offer.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|err| unique_conflict(err, "driver already has an offer on this order"))?;

        tx.commit().await?;

        Ok(offer)
    }

    #[tracing::instrument(skip(self))]
    async fn list_offers(&self, order_id: Uuid) -> Result<Vec<OfferView>, Error> {
        let rows = sqlx::query(
            "SELECT o.id, o.order_id, o.driver_id, o.price, o.note, o.status, o.created_at,
                    d.data AS driver
             FROM driver_offers o
             LEFT JOIN drivers d ON d.id = o.driver_id
             WHERE o.order_id = ?
             ORDER BY o.created_at ASC",
        )
        .bind(&order_id)
        .fetch_all(&self.pool)
        .await?;

        let mut views = Vec::with_capacity(rows.len());

        for row in rows {
            let offer = row_to_offer(&row)?;
            let driver: Option<Json<Driver>> = row.try_get("driver")?;

            let (driver_name, driver_rating) = match driver {
                Some(Json(driver)) => (driver.name, driver.rating),
                None => ("Unknown".into(), default_rating()),
            };

            views.push(OfferView {
                offer,
                driver_name,
                driver_rating,
            });
        }

        Ok(views)
    }

    #[tracing::instrument(skip(self))]
    async fn make_counter_offer(
        &self,
        order_id: Uuid,
        from_handle: String,
        to_driver_id: Uuid,
        price: i64,
    ) -> Result<Negotiation, Error> {
        let mut tx = self.pool.begin().await?;

        let passenger = fetch_passenger_by_handle(&mut tx, &from_handle).await?;
        let order = fetch_order(&mut tx, &order_id).await?;

        let negotiation = Negotiation::new(
            order.id,
            passenger.id,
            Party::Passenger,
            to_driver_id,
            price,
        );

        insert_negotiation(&mut tx, &negotiation).await?;

        tx.commit().await?;

        Ok(negotiation)
    }

    #[tracing::instrument(skip(self))]
    async fn respond_to_counter_offer(
        &self,
        driver_handle: String,
        negotiation_id: Uuid,
        accept: bool,
        counter_price: Option<i64>,
    ) -> Result<Negotiation, Error> {
        let mut tx = self.pool.begin().await?;

        let driver = fetch_driver_by_handle(&mut tx, &driver_handle).await?;
        let mut negotiation = fetch_negotiation(&mut tx, &negotiation_id).await?;

        if negotiation.to_user_id != driver.id {
            return Err(policy_denied("negotiation is not addressed to this driver"));
        }

        if accept {
            resolve_negotiation(&mut tx, &mut negotiation, NegotiationStatus::Accepted).await?;
            tx.commit().await?;

            return Ok(negotiation);
        }

        if let Some(counter_price) = counter_price {
            // a counter-proposal is a fresh node in the thread; the original
            // stays pending
            let order = fetch_order(&mut tx, &negotiation.order_id).await?;
            let reply = Negotiation::new(
                order.id,
                driver.id,
                Party::Driver,
                negotiation.from_user_id,
                counter_price,
            );

            insert_negotiation(&mut tx, &reply).await?;
            tx.commit().await?;

            return Ok(reply);
        }

        resolve_negotiation(&mut tx, &mut negotiation, NegotiationStatus::Rejected).await?;
        tx.commit().await?;

        Ok(negotiation)
    }
}

async fn insert_negotiation(
    tx: &mut sqlx::Transaction<'_, super::Database>,
    negotiation: &Negotiation,
) -> Result<(), Error> {
    sqlx::query(
        "INSERT INTO negotiations (id, order_id, from_user_id, from_party, to_user_id, price, status, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&negotiation.id)
    .bind(&negotiation.order_id)
    .bind(&negotiation.from_user_id)
    .bind(negotiation.from_party.name())
    .bind(&negotiation.to_user_id)
    .bind(&negotiation.price)
    .bind(negotiation.status.name())
    .bind(&negotiation.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn resolve_negotiation(
    tx: &mut sqlx::Transaction<'_, super::Database>,
    negotiation: &mut Negotiation,
    outcome: NegotiationStatus,
) -> Result<(), Error> {
    negotiation.resolve(outcome)?;

    let updated = sqlx::query("UPDATE negotiations SET status = ? WHERE id = ? AND status = ?")
        .bind(negotiation.status.name())
        .bind(&negotiation.id)
        .bind(NegotiationStatus::Pending.name())
        .execute(&mut **tx)
        .await?;

    if updated.rows_affected() == 0 {
        return Err(conflict("negotiation is already resolved"));
    }

    Ok(())
}
