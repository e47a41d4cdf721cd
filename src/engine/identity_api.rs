use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::Row;

use super::helpers::{fetch_driver_by_handle, fetch_passenger_by_handle, is_unique_violation, update_driver};
use super::Engine;

use crate::api::{IdentityApi, PartyKind, Registration};
use crate::entities::{Driver, Passenger, Vehicle};
use crate::error::Error;

#[async_trait]
impl IdentityApi for Engine {
    #[tracing::instrument(skip(self))]
    async fn register_passenger(
        &self,
        handle: String,
        name: String,
        phone: String,
    ) -> Result<Registration<Passenger>, Error> {
        let mut tx = self.pool.begin().await?;

        if let Some(row) = sqlx::query("SELECT data FROM passengers WHERE handle = ?")
            .bind(&handle)
            .fetch_optional(&mut *tx)
            .await?
        {
            let Json(profile) = row.try_get("data")?;
            return Ok(Registration {
                profile,
                returning: true,
            });
        }

        let passenger = Passenger::new(handle, name, phone);

        let inserted = sqlx::query("INSERT INTO passengers (id, handle, data) VALUES (?, ?, ?)")
            .bind(&passenger.id)
            .bind(&passenger.handle)
            .bind(Json(&passenger))
            .execute(&mut *tx)
            .await;

        if let Err(err) = inserted {
            if !is_unique_violation(&err) {
                return Err(err.into());
            }

            // a concurrent registration with this handle won; hand back theirs
            let profile = fetch_passenger_by_handle(&mut tx, &passenger.handle).await?;
            tx.commit().await?;

            return Ok(Registration {
                profile,
                returning: true,
            });
        }

        tx.commit().await?;

        Ok(Registration {
            profile: passenger,
            returning: false,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn register_driver(
        &self,
        handle: String,
        name: String,
        phone: String,
        vehicle: Vehicle,
    ) -> Result<Registration<Driver>, Error> {
        let mut tx = self.pool.begin().await?;

        if let Some(row) = sqlx::query("SELECT data FROM drivers WHERE handle = ?")
            .bind(&handle)
            .fetch_optional(&mut *tx)
            .await?
        {
            let Json(profile) = row.try_get("data")?;
            return Ok(Registration {
                profile,
                returning: true,
            });
        }

        let driver = Driver::new(handle, name, phone, vehicle);

        let inserted = sqlx::query("INSERT INTO drivers (id, handle, data) VALUES (?, ?, ?)")
            .bind(&driver.id)
            .bind(&driver.handle)
            .bind(Json(&driver))
            .execute(&mut *tx)
            .await;

        if let Err(err) = inserted {
            if !is_unique_violation(&err) {
                return Err(err.into());
            }

            let profile = fetch_driver_by_handle(&mut tx, &driver.handle).await?;
            tx.commit().await?;

            return Ok(Registration {
                profile,
                returning: true,
            });
        }

        tx.commit().await?;

        Ok(Registration {
            profile: driver,
            returning: false,
        })
    }

    #[tracing::instrument(skip(self))]
    async fn classify_party(&self, handle: String) -> Result<PartyKind, Error> {
        let mut tx = self.pool.begin().await?;

        let as_passenger = sqlx::query("SELECT 1 FROM passengers WHERE handle = ?")
            .bind(&handle)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();

        let as_driver = sqlx::query("SELECT 1 FROM drivers WHERE handle = ?")
            .bind(&handle)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();

        tx.commit().await?;

        let kind = match (as_passenger, as_driver) {
            (true, true) => PartyKind::Ambiguous,
            (true, false) => PartyKind::Passenger,
            (false, true) => PartyKind::Driver,
            (false, false) => PartyKind::Unknown,
        };

        Ok(kind)
    }

    #[tracing::instrument(skip(self))]
    async fn set_driver_availability(&self, handle: String, online: bool) -> Result<Driver, Error> {
        let mut tx = self.pool.begin().await?;

        let mut driver = fetch_driver_by_handle(&mut tx, &handle).await?;

        driver.online = online;
        update_driver(&mut tx, &driver).await?;

        tx.commit().await?;

        Ok(driver)
    }
}
