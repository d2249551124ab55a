//! End-to-end cart flows against SQLite.

use masterclass_core::{generate_id, CartEngine, CartStore, CoreError, Product};
use masterclass_db::seed::default_products;
use masterclass_db::{
    check_login, ensure_seed_data, CartRepository, Database, DbConfig, OrderRepository,
    ProductRepository, SeedOptions,
};

type SqliteEngine = CartEngine<ProductRepository, CartRepository, OrderRepository>;

async fn seeded() -> (Database, SqliteEngine) {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    ensure_seed_data(&db, &SeedOptions::default()).await.unwrap();
    let engine = CartEngine::new(db.products(), db.carts(), db.orders());
    (db, engine)
}

async fn by_sku(db: &Database, sku: &str) -> Product {
    db.products().get_by_sku(sku).await.unwrap().unwrap()
}

#[tokio::test]
async fn test_scenarios_a_through_e() {
    let (db, engine) = seeded().await;
    let react = by_sku(&db, "mc-react").await;
    let unity = by_sku(&db, "mc-unity").await;

    let cart_id = engine.create().await.unwrap();

    // A
    let cart = engine.add_item(&cart_id, &react.id).await.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].qty, 1);
    assert_eq!(cart.total.to_string(), "90.00");

    // B
    let cart = engine.add_item(&cart_id, &react.id).await.unwrap();
    assert_eq!(cart.items[0].qty, 2);
    assert_eq!(cart.items[0].subtotal.to_string(), "180.00");

    // C
    let cart = engine.add_item(&cart_id, &unity.id).await.unwrap();
    assert_eq!(cart.total.to_string(), "540.00");
    let warnings = engine.get_warnings(&cart_id).await.unwrap();
    assert_eq!(
        warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>(),
        vec!["One or more of your selected products requires a deposit."]
    );

    // D
    let cart = engine.change_qty(&cart_id, &react.id, 0).await.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.total.to_string(), "360.00");
    assert!(!engine.contains_item(&cart_id, &react.id).await.unwrap());

    // E
    let order = engine.checkout(&cart_id, "ninja@coders.ninja").await.unwrap();
    engine.clear(&cart_id).await.unwrap();
    engine.add_item(&cart_id, &react.id).await.unwrap();

    let stored = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.email, "ninja@coders.ninja");
    assert_eq!(stored.cart.total.to_string(), "360.00");
    assert_eq!(stored.cart.items.len(), 1);
    assert_eq!(stored.cart.items[0].product.id, unity.id);

    let live = engine.get_cart(&cart_id).await.unwrap();
    assert_eq!(live.total.to_string(), "90.00");
}

#[tokio::test]
async fn test_stored_cart_matches_returned_cart() {
    let (db, engine) = seeded().await;
    let products = db.products().find_all().await.unwrap();
    let cart_id = engine.create().await.unwrap();

    for (step, product) in products.iter().cycle().take(12).enumerate() {
        let cart = if step % 3 == 2 {
            engine.change_qty(&cart_id, &product.id, (step % 4) as i64).await.unwrap()
        } else {
            engine.add_item(&cart_id, &product.id).await.unwrap()
        };
        let stored = engine.get_cart(&cart_id).await.unwrap();
        assert!(stored.is_consistent(), "step {}", step);
        assert_eq!(stored.items, cart.items);
        assert_eq!(stored.total, cart.total);
        assert_eq!(stored.version, cart.version);
    }
}

#[tokio::test]
async fn test_stale_write_surfaces_conflict() {
    let (db, engine) = seeded().await;
    let react = by_sku(&db, "mc-react").await;
    let cart_id = engine.create().await.unwrap();

    let stale = engine.get_cart(&cart_id).await.unwrap();
    engine.add_item(&cart_id, &react.id).await.unwrap();

    let err = CartStore::replace(engine.carts(), &stale).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Conflict {
            expected_version: 0,
            ..
        }
    ));
    assert_eq!(engine.get_cart(&cart_id).await.unwrap().items.len(), 1);
}

#[tokio::test]
async fn test_corrupted_cart_total_blocks_checkout() {
    let (db, engine) = seeded().await;
    let react = by_sku(&db, "mc-react").await;
    let cart_id = engine.create().await.unwrap();
    engine.add_item(&cart_id, &react.id).await.unwrap();

    sqlx::query("UPDATE carts SET total = '1.00' WHERE id = ?1")
        .bind(&cart_id)
        .execute(db.pool())
        .await
        .unwrap();

    let err = engine.get_cart(&cart_id).await.unwrap_err();
    assert!(matches!(err, CoreError::Persistence(_)));

    let err = engine
        .checkout(&cart_id, "ninja@coders.ninja")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Persistence(_)));
    assert_eq!(db.orders().count().await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_checkout_during_writes_copies_one_cart_version() {
    let path = std::env::temp_dir().join(format!("masterclass-{}.db", generate_id()));
    let db = Database::new(DbConfig::new(&path)).await.unwrap();
    ensure_seed_data(&db, &SeedOptions::default()).await.unwrap();
    let engine: SqliteEngine = CartEngine::new(db.products(), db.carts(), db.orders());

    let react = by_sku(&db, "mc-react").await;
    let unity = by_sku(&db, "mc-unity").await;
    let cart_id = engine.create().await.unwrap();
    engine.add_item(&cart_id, &react.id).await.unwrap();

    let writer = {
        let engine: SqliteEngine = CartEngine::new(db.products(), db.carts(), db.orders());
        let cart_id = cart_id.clone();
        let unity_id = unity.id.clone();
        tokio::spawn(async move {
            for step in 0..100 {
                if step % 2 == 0 {
                    engine.add_item(&cart_id, &unity_id).await.unwrap();
                } else {
                    engine.remove_item(&cart_id, &unity_id).await.unwrap();
                }
            }
        })
    };

    for _ in 0..100 {
        let order = engine.checkout(&cart_id, "ninja@coders.ninja").await.unwrap();
        assert!(order.cart.is_consistent());
    }
    writer.await.unwrap();

    db.close().await;
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
    }
}

#[tokio::test]
async fn test_deleted_product_stays_in_cart_snapshot() {
    let (db, engine) = seeded().await;
    let flexbox = by_sku(&db, "mc-flexbox").await;
    let cart_id = engine.create().await.unwrap();
    engine.add_item(&cart_id, &flexbox.id).await.unwrap();

    db.products().delete(&flexbox.id).await.unwrap();

    let cart = engine.change_qty(&cart_id, &flexbox.id, 2).await.unwrap();
    assert_eq!(cart.total.to_string(), "180.00");
    let err = engine.add_item(&cart_id, &flexbox.id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_unknown_cart_is_not_found() {
    let (db, engine) = seeded().await;
    let react = by_sku(&db, "mc-react").await;

    assert!(engine.add_item("missing", &react.id).await.unwrap_err().is_not_found());
    assert!(engine.get_cart("missing").await.unwrap_err().is_not_found());
    assert!(!engine.contains_item("missing", &react.id).await.unwrap());
}

#[tokio::test]
async fn test_seeding_is_idempotent() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    let first = ensure_seed_data(&db, &SeedOptions::default()).await.unwrap();
    assert_eq!(first.products_inserted, 4);
    assert!(first.admin_created);

    let second = ensure_seed_data(&db, &SeedOptions::default()).await.unwrap();
    assert!(second.is_noop());
    assert_eq!(db.products().count().await.unwrap(), 4);
    assert_eq!(db.users().count().await.unwrap(), 1);

    let unity = by_sku(&db, "mc-unity").await;
    assert!(unity.requires_deposit);
    assert_eq!(unity.display_price("€"), "€360.00");
}

#[tokio::test]
async fn test_seeding_fills_missing_default_products() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let react = default_products()
        .into_iter()
        .find(|p| p.sku == "mc-react")
        .unwrap();
    db.products().insert(&react).await.unwrap();

    let report = ensure_seed_data(&db, &SeedOptions::default()).await.unwrap();
    assert_eq!(report.products_inserted, 3);
    assert_eq!(db.products().count().await.unwrap(), 4);
    assert_eq!(by_sku(&db, "mc-react").await.id, react.id);
    assert!(ensure_seed_data(&db, &SeedOptions::default())
        .await
        .unwrap()
        .is_noop());
}

#[tokio::test]
async fn test_seeded_admin_can_log_in() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let options = SeedOptions {
        admin_email: "boss@coders.ninja".to_string(),
        admin_password: "s3cret".to_string(),
    };
    ensure_seed_data(&db, &options).await.unwrap();

    let ok = check_login(&db, "boss@coders.ninja", "s3cret").await.unwrap();
    assert!(ok.valid_login);
    assert!(ok.is_admin);

    let bad = check_login(&db, "boss@coders.ninja", "admin123").await.unwrap();
    assert!(!bad.valid_login);
}
