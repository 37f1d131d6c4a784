// Behavior every TableStore implementation must share.
// Each test runs against all bundled backends.

mod common;

use common::{backends, seed};
use sheetkv_storage::{AppendOutcome, StorageError};

#[tokio::test]
async fn test_append_returns_next_row() {
    for backend in backends().await {
        let store = &backend.store;
        seed(store.as_ref(), "users", &[("a", "1"), ("b", "2")]).await;

        let outcome = store.append_row("users", "c", "3").await.unwrap();
        assert_eq!(outcome, AppendOutcome::Row(3), "backend {}", backend.name());
        assert_eq!(
            store.read_key_column("users").await.unwrap(),
            vec!["a", "b", "c"],
            "backend {}",
            backend.name()
        );
    }
}

#[tokio::test]
async fn test_empty_value_is_some() {
    for backend in backends().await {
        let store = &backend.store;
        seed(store.as_ref(), "users", &[("a", "")]).await;

        assert_eq!(
            store.read_cell("users", 1).await.unwrap(),
            Some(String::new()),
            "backend {}",
            backend.name()
        );
    }
}

#[tokio::test]
async fn test_write_cell_keeps_key() {
    for backend in backends().await {
        let store = &backend.store;
        seed(store.as_ref(), "users", &[("a", "1"), ("b", "2")]).await;

        store.write_cell("users", 2, "two").await.unwrap();
        assert_eq!(
            store.read_cell("users", 2).await.unwrap().as_deref(),
            Some("two")
        );
        assert_eq!(
            store.read_key_column("users").await.unwrap(),
            vec!["a", "b"]
        );
    }
}

#[tokio::test]
async fn test_descending_deletes_keep_lower_rows_stable() {
    for backend in backends().await {
        let store = &backend.store;
        seed(
            store.as_ref(),
            "users",
            &[("k1", "1"), ("k2", "2"), ("k3", "3"), ("k4", "4"), ("k5", "5"), ("k6", "6")],
        )
        .await;

        for row in [5, 3, 2] {
            store.delete_row("users", row).await.unwrap();
        }

        assert_eq!(
            store.read_key_column("users").await.unwrap(),
            vec!["k1", "k4", "k6"],
            "backend {}",
            backend.name()
        );
        assert_eq!(
            store.read_cell("users", 3).await.unwrap().as_deref(),
            Some("6")
        );
    }
}

#[tokio::test]
async fn test_out_of_range_rows() {
    for backend in backends().await {
        let store = &backend.store;
        seed(store.as_ref(), "users", &[("a", "1")]).await;

        assert_eq!(store.read_cell("users", 2).await.unwrap(), None);
        assert!(matches!(
            store.write_cell("users", 2, "x").await,
            Err(StorageError::RowOutOfRange { row: 2, .. })
        ));
        assert!(matches!(
            store.delete_row("users", 0).await,
            Err(StorageError::RowOutOfRange { row: 0, .. })
        ));
    }
}

#[tokio::test]
async fn test_missing_collection() {
    for backend in backends().await {
        let store = &backend.store;

        assert!(matches!(
            store.read_key_column("ghost").await,
            Err(StorageError::CollectionNotFound(_))
        ));
        assert!(matches!(
            store.append_row("ghost", "a", "1").await,
            Err(StorageError::CollectionNotFound(_))
        ));
        assert!(matches!(
            store.delete_collection("ghost").await,
            Err(StorageError::CollectionNotFound(_))
        ));
        assert!(matches!(
            store.rename_collection("ghost", "spirit").await,
            Err(StorageError::CollectionNotFound(_))
        ));
    }
}

#[tokio::test]
async fn test_collection_lifecycle() {
    for backend in backends().await {
        let store = &backend.store;
        seed(store.as_ref(), "orders", &[("o1", "x")]).await;
        store.create_collection("users").await.unwrap();

        assert!(matches!(
            store.create_collection("users").await,
            Err(StorageError::CollectionExists(_))
        ));

        store.rename_collection("orders", "archive").await.unwrap();
        let mut names = store.list_collections().await.unwrap();
        names.sort();
        assert_eq!(names, vec!["archive", "users"], "backend {}", backend.name());
        assert_eq!(
            store.read_key_column("archive").await.unwrap(),
            vec!["o1"]
        );

        store.delete_collection("users").await.unwrap();
        assert_eq!(store.list_collections().await.unwrap(), vec!["archive"]);
    }
}

#[tokio::test]
async fn test_invalid_names_rejected() {
    for backend in backends().await {
        let store = &backend.store;
        for name in ["", "  ", "a/b", ".."] {
            assert!(
                matches!(
                    store.create_collection(name).await,
                    Err(StorageError::InvalidName(_))
                ),
                "backend {} accepted {name:?}",
                backend.name()
            );
        }
    }
}

#[tokio::test]
async fn test_health_check() {
    for backend in backends().await {
        backend.store.health_check().await.unwrap();
    }
}
