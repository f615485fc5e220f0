//! Page-number pagination over sea-orm selects.

use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, Select};
use wavytv_common::{AppError, AppResult, PageRequest, Paginated};

/// Count the matches of `query`, reject out-of-range pages, then fetch the
/// requested page.
pub async fn fetch_page<E>(
    db: &DatabaseConnection,
    query: Select<E>,
    request: PageRequest,
) -> AppResult<Paginated<E::Model>>
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    let paginator = query.paginate(db, request.page_size);
    let total_docs = paginator
        .num_items()
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    request.ensure_in_range(total_docs)?;

    if total_docs == 0 {
        return Ok(Paginated::new(Vec::new(), request, 0));
    }

    let docs = paginator
        .fetch_page(request.index())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Paginated::new(docs, request, total_docs))
}

/// Escape `%` and `_` and wrap `query` for a lowercase substring match.
#[must_use]
pub fn like_pattern(query: &str) -> String {
    format!(
        "%{}%",
        query
            .trim()
            .to_lowercase()
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_")
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::{Post, post};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, QueryOrder};

    fn create_test_post(id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            public_id: format!("pub_{id}"),
            content: "hello".to_string(),
            owner_id: "user1".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        maplit::btreemap! { "num_items" => sea_orm::Value::BigInt(Some(n)) }
    }

    #[tokio::test]
    async fn test_fetch_page_returns_envelope() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(12)]])
            .append_query_results([[create_test_post("p11"), create_test_post("p12")]])
            .into_connection();

        let request = PageRequest::new(2, 10).unwrap();
        let page = fetch_page(
            &db,
            Post::find().order_by_desc(post::Column::CreatedAt),
            request,
        )
        .await
        .unwrap();

        assert_eq!(page.docs.len(), 2);
        assert_eq!(page.total_docs, 12);
        assert_eq!(page.total_pages, 2);
        assert!(!page.has_next_page);
        assert_eq!(page.prev_page, Some(1));
    }

    #[tokio::test]
    async fn test_fetch_page_past_end_is_invalid_page() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(5)]])
            .into_connection();

        let request = PageRequest::new(2, 10).unwrap();
        let err = fetch_page(&db, Post::find(), request).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::InvalidPage {
                page: 2,
                total_pages: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_fetch_page_empty_first_page() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(0)]])
            .into_connection();

        let page = fetch_page(&db, Post::find(), PageRequest::default())
            .await
            .unwrap();

        assert!(page.docs.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" Cats_100% "), "%cats\\_100\\%%");
    }
}
