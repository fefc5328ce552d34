//! Batch lookups used to embed related records in list responses.

use crate::entities::{event_entity as events, user_entity as users};
use crate::models::{EventRef, UserRef};
use sea_orm::sea_query::{Expr, Func, IntoColumnRef, LikeExpr, SimpleExpr};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter};
use std::collections::{BTreeSet, HashMap};

pub async fn event_refs<C, I>(
    db: &C,
    ids: I,
    with_slug: bool,
) -> Result<HashMap<i64, EventRef>, DbErr>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = Option<i64>>,
{
    let ids: BTreeSet<i64> = ids.into_iter().flatten().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let found = events::Entity::find()
        .filter(events::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(found
        .into_iter()
        .map(|e| {
            (
                e.id,
                EventRef {
                    id: e.id,
                    title: e.title,
                    slug: with_slug.then_some(e.slug),
                },
            )
        })
        .collect())
}

pub async fn user_refs<C, I>(db: &C, ids: I) -> Result<HashMap<i64, UserRef>, DbErr>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = Option<i64>>,
{
    let ids: BTreeSet<i64> = ids.into_iter().flatten().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let found = users::Entity::find()
        .filter(users::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(found
        .into_iter()
        .map(|u| {
            (
                u.id,
                UserRef {
                    id: u.id,
                    username: u.username,
                },
            )
        })
        .collect())
}

fn contains_pattern(search: &str) -> LikeExpr {
    let escaped = search
        .trim()
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    LikeExpr::new(format!("%{escaped}%")).escape('\\')
}

/// Case-insensitive substring match on a text column.
pub fn lower_contains<T: IntoColumnRef>(column: T, search: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(contains_pattern(search))
}
