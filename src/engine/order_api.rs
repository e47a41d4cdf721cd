use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::Row;
use uuid::Uuid;

use super::helpers::{fetch_offer, fetch_order, fetch_passenger_by_handle, update_order};
use super::Engine;

use crate::api::{AvailableOrder, OrderApi};
use crate::entities::{default_rating, OfferStatus, Order, OrderStatus, Passenger};
use crate::error::{conflict, not_found, Error};

#[async_trait]
impl OrderApi for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_order(
        &self,
        passenger_handle: String,
        origin: String,
        destination: String,
        suggested_price: i64,
    ) -> Result<Order, Error> {
        let mut tx = self.pool.begin().await?;

        let passenger = fetch_passenger_by_handle(&mut tx, &passenger_handle).await?;
        let order = Order::new(passenger.id, origin, destination, suggested_price);

        sqlx::query(
            "INSERT INTO orders (id, passenger_id, status, created_at, data) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&order.id)
        .bind(&order.passenger_id)
        .bind(order.status.name())
        .bind(&order.created_at)
        .bind(Json(&order))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    async fn list_available_orders(&self) -> Result<Vec<AvailableOrder>, Error> {
        let rows = sqlx::query(
            "SELECT o.data AS order_data, p.data AS passenger
             FROM orders o
             LEFT JOIN passengers p ON p.id = o.passenger_id
             WHERE o.status = ?
             ORDER BY o.created_at DESC",
        )
        .bind(OrderStatus::Pending.name())
        .fetch_all(&self.pool)
        .await?;

        let mut available = Vec::with_capacity(rows.len());

        for row in rows {
            let Json(order): Json<Order> = row.try_get("order_data")?;
            let passenger: Option<Json<Passenger>> = row.try_get("passenger")?;

            // a missing join row degrades that entry, never the whole listing
            let (passenger_name, passenger_rating) = match passenger {
                Some(Json(passenger)) => (passenger.name, passenger.rating),
                None => ("Unknown".into(), default_rating()),
            };

            available.push(AvailableOrder {
                order,
                passenger_name,
                passenger_rating,
            });
        }

        Ok(available)
    }

    #[tracing::instrument(skip(self))]
    async fn accept_offer(&self, offer_id: Uuid, order_id: Uuid) -> Result<Order, Error> {
        let mut tx = self.pool.begin().await?;

        let offer = fetch_offer(&mut tx, &offer_id).await?;

        if offer.order_id != order_id {
            return Err(not_found("offer"));
        }

        let mut order = fetch_order(&mut tx, &offer.order_id).await?;
        order.accept(offer.driver_id, offer.price)?;

        // conditional update: only an order still open to acceptance can flip,
        // so exactly one of two racing acceptances wins
        let updated = sqlx::query("UPDATE orders SET status = ?, data = ? WHERE id = ? AND status IN (?, ?)")
            .bind(order.status.name())
            .bind(Json(&order))
            .bind(&order.id)
            .bind(OrderStatus::Pending.name())
            .bind(OrderStatus::Negotiating.name())
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(conflict("order is no longer available"));
        }

        // sibling offers on the order are left pending
        sqlx::query("UPDATE driver_offers SET status = ? WHERE id = ?")
            .bind(OfferStatus::Accepted.name())
            .bind(&offer.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    async fn start_ride(&self, order_id: Uuid) -> Result<Order, Error> {
        let mut tx = self.pool.begin().await?;

        let mut order = fetch_order(&mut tx, &order_id).await?;

        order.start()?;
        update_order(&mut tx, &order).await?;

        tx.commit().await?;

        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    async fn complete_ride(&self, order_id: Uuid) -> Result<Order, Error> {
        let mut tx = self.pool.begin().await?;

        let mut order = fetch_order(&mut tx, &order_id).await?;

        order.complete()?;
        update_order(&mut tx, &order).await?;

        tx.commit().await?;

        Ok(order)
    }

    #[tracing::instrument(skip(self))]
    async fn cancel_order(&self, order_id: Uuid) -> Result<Order, Error> {
        let mut tx = self.pool.begin().await?;

        let mut order = fetch_order(&mut tx, &order_id).await?;

        order.cancel()?;
        update_order(&mut tx, &order).await?;

        tx.commit().await?;

        Ok(order)
    }
}
