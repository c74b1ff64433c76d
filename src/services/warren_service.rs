//! src/services/warren_service.rs
//!
//! WarrenService: rabbit holes and the bunnies living in them.
//!
//! Every operation is scoped to the requesting user: holes are only visible
//! to their owner, and bunnies only through the hole they live in. The bunny
//! quota is enforced by a single conditional INSERT so concurrent creations
//! for the same hole cannot overshoot `bunnies_limit`.

use super::{ServiceError, ServiceResult, is_unique_violation};
use crate::models::{
    bunny::{Bunny, BunnyChanges, BunnyView},
    rabbit_hole::{NewRabbitHole, RabbitHole, RabbitHoleChanges, RabbitHoleView},
    user::User,
};
use sqlx::SqlitePool;
use std::{collections::HashMap, sync::Arc};
use tracing::debug;

const HOLE_COLUMNS: &str = "id, location, owner_id, bunnies_limit, latitude, longitude";

#[derive(Clone)]
pub struct WarrenService {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

/// Reject access to a hole the requester does not own.
fn ensure_owner(requester: &User, hole: &RabbitHole) -> ServiceResult<()> {
    if hole.owner_id == requester.id {
        Ok(())
    } else {
        Err(ServiceError::Forbidden(
            "You do not have permission to perform this action.".into(),
        ))
    }
}

/// Owners may delete their holes, and so may superusers.
fn ensure_can_delete(requester: &User, hole: &RabbitHole) -> ServiceResult<()> {
    if requester.is_superuser {
        return Ok(());
    }
    ensure_owner(requester, hole)
}

impl WarrenService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------
    // Rabbit holes
    // ------------------------------------------------------------------

    pub async fn fetch_hole(&self, id: i64) -> ServiceResult<RabbitHole> {
        sqlx::query_as::<_, RabbitHole>(&format!(
            "SELECT {HOLE_COLUMNS} FROM rabbit_holes WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or_else(|| ServiceError::not_found("rabbit hole", id))
    }

    async fn fetch_hole_by_location(&self, location: &str) -> ServiceResult<RabbitHole> {
        sqlx::query_as::<_, RabbitHole>(&format!(
            "SELECT {HOLE_COLUMNS} FROM rabbit_holes WHERE location = ?"
        ))
        .bind(location)
        .fetch_optional(&*self.db)
        .await?
        .ok_or_else(|| ServiceError::not_found("rabbit hole", location))
    }

    async fn bunny_names(&self, hole_id: i64) -> ServiceResult<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT name FROM bunnies WHERE home_id = ? ORDER BY id",
        )
        .bind(hole_id)
        .fetch_all(&*self.db)
        .await?;
        Ok(names)
    }

    async fn hole_view(&self, hole: RabbitHole) -> ServiceResult<RabbitHoleView> {
        let names = self.bunny_names(hole.id).await?;
        Ok(RabbitHoleView::new(hole, names))
    }

    /// All holes owned by `owner`, ordered by id.
    pub async fn list_holes(&self, owner: &User) -> ServiceResult<Vec<RabbitHoleView>> {
        let holes = sqlx::query_as::<_, RabbitHole>(&format!(
            "SELECT {HOLE_COLUMNS} FROM rabbit_holes WHERE owner_id = ? ORDER BY id"
        ))
        .bind(owner.id)
        .fetch_all(&*self.db)
        .await?;

        let rows: Vec<(i64, String)> = sqlx::query_as(
            "SELECT b.home_id, b.name FROM bunnies b
             JOIN rabbit_holes h ON h.id = b.home_id
             WHERE h.owner_id = ?
             ORDER BY b.id",
        )
        .bind(owner.id)
        .fetch_all(&*self.db)
        .await?;

        let mut names_by_hole: HashMap<i64, Vec<String>> = HashMap::new();
        for (home_id, name) in rows {
            names_by_hole.entry(home_id).or_default().push(name);
        }

        Ok(holes
            .into_iter()
            .map(|hole| {
                let names = names_by_hole.remove(&hole.id).unwrap_or_default();
                RabbitHoleView::new(hole, names)
            })
            .collect())
    }

    pub async fn get_hole(&self, requester: &User, id: i64) -> ServiceResult<RabbitHoleView> {
        let hole = self.fetch_hole(id).await?;
        ensure_owner(requester, &hole)?;
        self.hole_view(hole).await
    }

    /// Create a hole owned by `owner`. Location names are globally unique.
    pub async fn create_hole(
        &self,
        owner: &User,
        new: NewRabbitHole,
    ) -> ServiceResult<RabbitHoleView> {
        let hole = sqlx::query_as::<_, RabbitHole>(&format!(
            "INSERT INTO rabbit_holes (location, owner_id, bunnies_limit, latitude, longitude)
             VALUES (?, ?, ?, ?, ?)
             RETURNING {HOLE_COLUMNS}"
        ))
        .bind(&new.location)
        .bind(owner.id)
        .bind(new.bunnies_limit)
        .bind(new.latitude)
        .bind(new.longitude)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ServiceError::DuplicateLocation(new.location.clone())
            } else {
                ServiceError::Sqlx(err)
            }
        })?;

        debug!(hole_id = hole.id, owner_id = owner.id, "created rabbit hole");
        Ok(RabbitHoleView::new(hole, Vec::new()))
    }

    pub async fn update_hole(
        &self,
        requester: &User,
        id: i64,
        changes: RabbitHoleChanges,
    ) -> ServiceResult<RabbitHoleView> {
        let hole = self.fetch_hole(id).await?;
        ensure_owner(requester, &hole)?;

        let location = changes.location.clone();
        let updated = sqlx::query_as::<_, RabbitHole>(&format!(
            "UPDATE rabbit_holes SET
                location = COALESCE(?, location),
                bunnies_limit = COALESCE(?, bunnies_limit),
                latitude = COALESCE(?, latitude),
                longitude = COALESCE(?, longitude)
             WHERE id = ?
             RETURNING {HOLE_COLUMNS}"
        ))
        .bind(changes.location)
        .bind(changes.bunnies_limit)
        .bind(changes.latitude)
        .bind(changes.longitude)
        .bind(id)
        .fetch_optional(&*self.db)
        .await
        .map_err(|err| match location {
            Some(location) if is_unique_violation(&err) => {
                ServiceError::DuplicateLocation(location)
            }
            _ => ServiceError::Sqlx(err),
        })?
        .ok_or_else(|| ServiceError::not_found("rabbit hole", id))?;

        self.hole_view(updated).await
    }

    /// Delete a hole and, by cascade, its bunnies.
    pub async fn delete_hole(&self, requester: &User, id: i64) -> ServiceResult<()> {
        let hole = self.fetch_hole(id).await?;
        ensure_can_delete(requester, &hole)?;

        let result = sqlx::query("DELETE FROM rabbit_holes WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("rabbit hole", id));
        }

        debug!(hole_id = id, requester_id = requester.id, "deleted rabbit hole");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Bunnies
    // ------------------------------------------------------------------

    /// Insert a bunny into `home` unless the hole is already full.
    ///
    /// The capacity check and the insert are one statement, so SQLite's write
    /// lock serialises concurrent creations for the same hole.
    pub async fn create_bunny(&self, home: &RabbitHole, name: &str) -> ServiceResult<Bunny> {
        let inserted = sqlx::query_as::<_, Bunny>(
            "INSERT INTO bunnies (name, home_id)
             SELECT ?, h.id FROM rabbit_holes h
             WHERE h.id = ?
               AND (SELECT COUNT(*) FROM bunnies b WHERE b.home_id = h.id) < h.bunnies_limit
             RETURNING id, name, home_id",
        )
        .bind(name)
        .bind(home.id)
        .fetch_optional(&*self.db)
        .await?;

        match inserted {
            Some(bunny) => {
                debug!(bunny_id = bunny.id, hole_id = home.id, "created bunny");
                Ok(bunny)
            }
            None => {
                // Either the hole vanished or it is full; the limit may have
                // changed since the caller loaded it.
                let current = self.fetch_hole(home.id).await?;
                Err(ServiceError::CapacityExceeded {
                    limit: current.bunnies_limit,
                })
            }
        }
    }

    /// Create a bunny in the hole at `home_location`, which the requester must own.
    pub async fn create_bunny_in(
        &self,
        requester: &User,
        home_location: &str,
        name: &str,
    ) -> ServiceResult<BunnyView> {
        let home = self.fetch_hole_by_location(home_location).await?;
        ensure_owner(requester, &home)?;
        let bunny = self.create_bunny(&home, name).await?;
        self.bunny_view(bunny, home.location).await
    }

    async fn fetch_bunny(&self, id: i64) -> ServiceResult<Bunny> {
        sqlx::query_as::<_, Bunny>("SELECT id, name, home_id FROM bunnies WHERE id = ?")
            .bind(id)
            .fetch_optional(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("bunny", id))
    }

    /// Load a bunny together with its home, checking the requester owns the home.
    async fn fetch_owned_bunny(
        &self,
        requester: &User,
        id: i64,
    ) -> ServiceResult<(Bunny, RabbitHole)> {
        let bunny = self.fetch_bunny(id).await?;
        let home = self.fetch_hole(bunny.home_id).await?;
        ensure_owner(requester, &home)?;
        Ok((bunny, home))
    }

    async fn bunny_view(&self, bunny: Bunny, home_location: String) -> ServiceResult<BunnyView> {
        let family_members = sqlx::query_scalar::<_, String>(
            "SELECT name FROM bunnies WHERE home_id = ? AND id != ? ORDER BY id",
        )
        .bind(bunny.home_id)
        .bind(bunny.id)
        .fetch_all(&*self.db)
        .await?;

        Ok(BunnyView {
            id: bunny.id,
            name: bunny.name,
            home: home_location,
            family_members,
        })
    }

    /// Every bunny living in a hole owned by `owner`, ordered by id.
    pub async fn list_bunnies(&self, owner: &User) -> ServiceResult<Vec<BunnyView>> {
        let rows: Vec<(i64, String, i64, String)> = sqlx::query_as(
            "SELECT b.id, b.name, b.home_id, h.location FROM bunnies b
             JOIN rabbit_holes h ON h.id = b.home_id
             WHERE h.owner_id = ?
             ORDER BY b.id",
        )
        .bind(owner.id)
        .fetch_all(&*self.db)
        .await?;

        let mut residents: HashMap<i64, Vec<(i64, String)>> = HashMap::new();
        for (id, name, home_id, _) in &rows {
            residents
                .entry(*home_id)
                .or_default()
                .push((*id, name.clone()));
        }

        Ok(rows
            .into_iter()
            .map(|(id, name, home_id, location)| {
                let family_members = residents
                    .get(&home_id)
                    .map(|members| {
                        members
                            .iter()
                            .filter(|(member_id, _)| *member_id != id)
                            .map(|(_, member_name)| member_name.clone())
                            .collect()
                    })
                    .unwrap_or_default();
                BunnyView {
                    id,
                    name,
                    home: location,
                    family_members,
                }
            })
            .collect())
    }

    pub async fn get_bunny(&self, requester: &User, id: i64) -> ServiceResult<BunnyView> {
        let (bunny, home) = self.fetch_owned_bunny(requester, id).await?;
        self.bunny_view(bunny, home.location).await
    }

    /// Rename a bunny and/or move it to another hole the requester owns.
    ///
    /// Moving is gated by the destination's quota the same way creation is,
    /// and a rename travelling with a move is applied in the same statement.
    pub async fn update_bunny(
        &self,
        requester: &User,
        id: i64,
        changes: BunnyChanges,
    ) -> ServiceResult<BunnyView> {
        let (bunny, home) = self.fetch_owned_bunny(requester, id).await?;

        let destination = match changes.home {
            Some(location) => {
                let destination = self.fetch_hole_by_location(&location).await?;
                ensure_owner(requester, &destination)?;
                Some(destination)
            }
            None => None,
        };

        match destination {
            Some(destination) if destination.id != home.id => {
                let moved = self
                    .move_bunny(bunny.id, &destination, changes.name.as_deref())
                    .await?;
                self.bunny_view(moved, destination.location).await
            }
            _ => {
                let renamed = match changes.name {
                    Some(name) => self.rename_bunny(bunny.id, &name).await?,
                    None => bunny,
                };
                self.bunny_view(renamed, home.location).await
            }
        }
    }

    async fn rename_bunny(&self, id: i64, name: &str) -> ServiceResult<Bunny> {
        sqlx::query_as::<_, Bunny>(
            "UPDATE bunnies SET name = ? WHERE id = ? RETURNING id, name, home_id",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or_else(|| ServiceError::not_found("bunny", id))
    }

    /// Move bunny `id` into `destination` if it has room, renaming it when
    /// `name` is given. Nothing changes when the move is refused.
    async fn move_bunny(
        &self,
        id: i64,
        destination: &RabbitHole,
        name: Option<&str>,
    ) -> ServiceResult<Bunny> {
        let moved = sqlx::query_as::<_, Bunny>(
            "UPDATE bunnies SET home_id = ?, name = COALESCE(?, name)
             WHERE id = ?
               AND (SELECT COUNT(*) FROM bunnies b WHERE b.home_id = ?)
                   < (SELECT h.bunnies_limit FROM rabbit_holes h WHERE h.id = ?)
             RETURNING id, name, home_id",
        )
        .bind(destination.id)
        .bind(name)
        .bind(id)
        .bind(destination.id)
        .bind(destination.id)
        .fetch_optional(&*self.db)
        .await?;

        match moved {
            Some(bunny) => {
                debug!(bunny_id = bunny.id, hole_id = destination.id, "moved bunny");
                Ok(bunny)
            }
            None => {
                // The bunny may have been deleted since it was loaded; only a
                // bunny that still exists was turned away for lack of room.
                self.fetch_bunny(id).await?;
                let current = self.fetch_hole(destination.id).await?;
                Err(ServiceError::CapacityExceeded {
                    limit: current.bunnies_limit,
                })
            }
        }
    }

    pub async fn delete_bunny(&self, requester: &User, id: i64) -> ServiceResult<()> {
        self.fetch_owned_bunny(requester, id).await?;

        let result = sqlx::query("DELETE FROM bunnies WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found("bunny", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db, models::user::UserRoles, services::user_service::UserService};

    async fn service() -> (WarrenService, User) {
        let pool = Arc::new(db::connect("sqlite::memory:", 1).await.unwrap());
        db::run_migrations(&pool).await.unwrap();
        let owner = UserService::new(pool.clone())
            .create_user("mother", UserRoles::default())
            .await
            .unwrap();
        (WarrenService::new(pool), owner)
    }

    async fn hole(warren: &WarrenService, owner: &User, location: &str, limit: i64) -> RabbitHole {
        let view = warren
            .create_hole(
                owner,
                NewRabbitHole {
                    location: location.into(),
                    bunnies_limit: limit,
                    latitude: 0.0,
                    longitude: 0.0,
                },
            )
            .await
            .unwrap();
        warren.fetch_hole(view.id).await.unwrap()
    }

    #[tokio::test]
    async fn moving_a_vanished_bunny_is_not_found() {
        let (warren, owner) = service().await;
        let from = hole(&warren, &owner, "burrow", 5).await;
        let to = hole(&warren, &owner, "meadow", 5).await;
        let bunny = warren.create_bunny(&from, "Thumper").await.unwrap();
        sqlx::query("DELETE FROM bunnies WHERE id = ?")
            .bind(bunny.id)
            .execute(&*warren.db)
            .await
            .unwrap();

        let err = warren.move_bunny(bunny.id, &to, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: "bunny", .. }));
    }

    #[tokio::test]
    async fn a_refused_move_keeps_the_old_name() {
        let (warren, owner) = service().await;
        let from = hole(&warren, &owner, "burrow", 5).await;
        let to = hole(&warren, &owner, "meadow", 0).await;
        let bunny = warren.create_bunny(&from, "Thumper").await.unwrap();

        let err = warren
            .move_bunny(bunny.id, &to, Some("Flopsy"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::CapacityExceeded { limit: 0 }));

        let unchanged = warren.fetch_bunny(bunny.id).await.unwrap();
        assert_eq!(unchanged.name, "Thumper");
        assert_eq!(unchanged.home_id, from.id);
    }
}
