use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use super::helpers::{
    fetch_driver, fetch_driver_by_handle, fetch_order, fetch_passenger, fetch_passenger_by_handle,
    unique_conflict, update_driver, update_passenger,
};
use super::Engine;

use crate::api::{RatingApi, RatingSummary};
use crate::entities::{average_score, default_rating, Party, Rating};
use crate::error::{conflict, policy_denied, validation, Error};

#[async_trait]
impl RatingApi for Engine {
    #[tracing::instrument(skip(self))]
    async fn rate_ride(
        &self,
        from_handle: String,
        order_id: Uuid,
        role: Party,
        score: i64,
        comment: Option<String>,
    ) -> Result<Rating, Error> {
        if !(1..=5).contains(&score) {
            return Err(validation("score must be between 1 and 5"));
        }

        let mut tx = self.pool.begin().await?;

        let order = fetch_order(&mut tx, &order_id).await?;

        let (from_user_id, to_user_id) = match role {
            Party::Passenger => {
                let passenger = fetch_passenger_by_handle(&mut tx, &from_handle).await?;

                if order.passenger_id != passenger.id {
                    return Err(policy_denied("rater is not the passenger on this order"));
                }

                let driver_id = order
                    .accepted_driver_id
                    .ok_or_else(|| validation("order has no accepted driver"))?;

                (passenger.id, driver_id)
            }
            Party::Driver => {
                let driver = fetch_driver_by_handle(&mut tx, &from_handle).await?;

                if order.accepted_driver_id != Some(driver.id) {
                    return Err(policy_denied("rater is not the driver on this order"));
                }

                (driver.id, order.passenger_id)
            }
        };

        // pre-check; UNIQUE (order_id, from_user_id) is the authoritative guard
        let existing = sqlx::query("SELECT 1 FROM ratings WHERE order_id = ? AND from_user_id = ?")
            .bind(&order.id)
            .bind(&from_user_id)
            .fetch_optional(&mut *tx)
            .await?;

        if existing.is_some() {
            return Err(conflict("ride is already rated by this user"));
        }

        let rating = Rating::new(
            order.id,
            from_user_id,
            to_user_id,
            role.opposite(),
            score,
            comment,
        );

        sqlx::query(
            "INSERT INTO ratings (id, order_id, from_user_id, to_user_id, to_role, score, comment, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&rating.id)
        .bind(&rating.order_id)
        .bind(&rating.from_user_id)
        .bind(&rating.to_user_id)
        .bind(rating.to_role.name())
        .bind(&rating.score)
        .bind(&rating.comment)
        .bind(&rating.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|err| unique_conflict(err, "ride is already rated by this user"))?;

        tx.commit().await?;

        // a failed refresh leaves the stored aggregate as it was; the next
        // full-history recomputation corrects it
        if let Err(err) = self
            .recompute_user_rating(&rating.to_user_id, rating.to_role)
            .await
        {
            tracing::error!(?err, "aggregate rating refresh failed");
        }

        Ok(rating)
    }

    #[tracing::instrument(skip(self))]
    async fn user_rating(&self, user_id: Uuid, role: Party) -> Result<RatingSummary, Error> {
        let rows = sqlx::query(
            "SELECT score, comment FROM ratings
             WHERE to_user_id = ? AND to_role = ?
             ORDER BY created_at DESC",
        )
        .bind(&user_id)
        .bind(role.name())
        .fetch_all(&self.pool)
        .await?;

        if rows.is_empty() {
            return Ok(RatingSummary {
                rating: default_rating(),
                count: 0,
                comments: Vec::new(),
            });
        }

        let mut scores = Vec::with_capacity(rows.len());
        let mut comments = Vec::new();

        for row in &rows {
            scores.push(row.try_get::<i64, _>("score")?);

            if comments.len() < 5 {
                if let Some(comment) = row.try_get::<Option<String>, _>("comment")? {
                    comments.push(comment);
                }
            }
        }

        Ok(RatingSummary {
            rating: average_score(&scores),
            count: scores.len() as i64,
            comments,
        })
    }
}

impl Engine {
    /// Recomputes the target's aggregate from the full rating history and
    /// writes it back to the profile, along with the rated-ride count.
    #[tracing::instrument(skip(self))]
    async fn recompute_user_rating(&self, user_id: &Uuid, role: Party) -> Result<(), Error> {
        let mut tx = self.pool.begin().await?;

        let rows = sqlx::query("SELECT score FROM ratings WHERE to_user_id = ? AND to_role = ?")
            .bind(user_id)
            .bind(role.name())
            .fetch_all(&mut *tx)
            .await?;

        let mut scores = Vec::with_capacity(rows.len());
        for row in &rows {
            scores.push(row.try_get::<i64, _>("score")?);
        }

        let average = average_score(&scores);
        let count = scores.len() as i64;

        match role {
            Party::Driver => {
                let mut driver = fetch_driver(&mut tx, user_id).await?;
                driver.rating = average;
                driver.total_rides = count;
                update_driver(&mut tx, &driver).await?;
            }
            Party::Passenger => {
                let mut passenger = fetch_passenger(&mut tx, user_id).await?;
                passenger.rating = average;
                passenger.total_rides = count;
                update_passenger(&mut tx, &passenger).await?;
            }
        }

        tx.commit().await?;

        Ok(())
    }
}
