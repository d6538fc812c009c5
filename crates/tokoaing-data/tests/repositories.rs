use std::sync::Arc;

use entity::{CustomButton, Product, ProductPatch, UserPatch};
use tokoaing_data::{
    ButtonsRepository, CatalogRepository, IdentityRepository, MemoryStore, MessagingRepository,
    NewPurchase, PurchaseLedger, RealtimeStore, ReviewsRepository, ANNOUNCEMENT_PREFIX,
};

fn store() -> Arc<dyn RealtimeStore> {
    Arc::new(MemoryStore::new())
}

#[tokio::test]
async fn added_products_round_trip_through_the_feed() {
    let store = store();
    let catalog = CatalogRepository::new(store.clone());
    let mut feed = catalog.subscribe();
    assert!(feed.next().await.unwrap().is_empty());

    let product = Product {
        id: String::new(),
        name: "Sticker Pack".to_string(),
        price: 15000,
        stock: 10,
        max_stock: 10,
        is_active: true,
        category: "merch".to_string(),
        description: "A pack of stickers".to_string(),
        image_url: "https://example.com/s.png".to_string(),
        buy_link: "https://example.com/buy".to_string(),
    };
    let id = catalog.add(&product).await.unwrap();

    let products = feed.next().await.unwrap();
    assert_eq!(products.len(), 1);
    let got = &products[0];
    assert_eq!(got.id, id);
    assert_eq!(got.name, product.name);
    assert_eq!(got.price, product.price);
    assert_eq!(got.stock, product.stock);
    assert_eq!(got.max_stock, product.max_stock);
    assert_eq!(got.category, product.category);
    assert_eq!(got.buy_link, product.buy_link);
}

#[tokio::test]
async fn product_patches_merge_into_existing_records() {
    let store = store();
    let catalog = CatalogRepository::new(store.clone());

    let id = catalog
        .add(&Product {
            id: String::new(),
            name: "Sticker Pack".to_string(),
            price: 15000,
            stock: 10,
            max_stock: 10,
            is_active: true,
            category: "merch".to_string(),
            description: String::new(),
            image_url: String::new(),
            buy_link: String::new(),
        })
        .await
        .unwrap();

    catalog
        .update(
            &id,
            &ProductPatch {
                stock: Some(25),
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let products = catalog.subscribe().current();
    assert_eq!(products[0].stock, 25);
    assert!(!products[0].is_active);
    assert_eq!(products[0].name, "Sticker Pack", "unpatched field survives");
}

#[tokio::test]
async fn deleted_products_leave_the_feed() {
    let store = store();
    let catalog = CatalogRepository::new(store.clone());

    let id = catalog
        .add(&Product {
            id: String::new(),
            name: "Sticker Pack".to_string(),
            price: 15000,
            stock: 10,
            max_stock: 10,
            is_active: true,
            category: "merch".to_string(),
            description: String::new(),
            image_url: String::new(),
            buy_link: String::new(),
        })
        .await
        .unwrap();
    catalog.delete(&id).await.unwrap();

    assert!(catalog.subscribe().current().is_empty());
}

#[tokio::test]
async fn user_records_round_trip_and_record_logins() {
    let store = store();
    let identity = IdentityRepository::new(store.clone());

    let created = identity
        .create("uid-1", "aing@example.com", "aing")
        .await
        .unwrap();
    assert_eq!(created.mystery_box_attempts, 0);

    let fetched = identity.get("uid-1").await.unwrap().unwrap();
    assert_eq!(fetched.uid, "uid-1");
    assert_eq!(fetched.email, "aing@example.com");
    assert_eq!(fetched.nickname, "aing");
    assert!(fetched.is_active);

    identity
        .update(
            "uid-1",
            &UserPatch {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let fetched = identity.get("uid-1").await.unwrap().unwrap();
    assert!(!fetched.is_active);
    assert_eq!(fetched.nickname, "aing");

    identity.record_login("uid-1").await.unwrap();
    let after_login = identity.get("uid-1").await.unwrap().unwrap();
    assert!(after_login.last_login >= fetched.last_login);

    identity.delete("uid-1").await.unwrap();
    assert!(identity.get("uid-1").await.unwrap().is_none());
}

#[tokio::test]
async fn missing_users_read_as_none() {
    let store = store();
    let identity = IdentityRepository::new(store.clone());
    assert!(identity.get("ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn reviews_arrive_newest_first() {
    let store = store();
    let reviews = ReviewsRepository::new(store.clone());

    reviews.add("aing", "first").await.unwrap();
    reviews.add("budi", "second").await.unwrap();
    reviews.add("cica", "third").await.unwrap();

    let all = reviews.subscribe().current();
    let texts: Vec<&str> = all.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn inboxes_are_per_user_and_newest_first() {
    let store = store();
    let messages = MessagingRepository::new(store.clone());

    messages.send("u1", "hello").await.unwrap();
    messages.send("u2", "other inbox").await.unwrap();
    let id = messages.send("u1", "again").await.unwrap();

    let inbox = messages.subscribe("u1").current();
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0].text, "again");
    assert_eq!(inbox[1].text, "hello");
    assert!(!inbox[0].is_read);

    messages.mark_read(&id).await.unwrap();
    let inbox = messages.subscribe("u1").current();
    assert!(inbox[0].is_read);
    assert!(!inbox[1].is_read, "other messages untouched");
}

#[tokio::test]
async fn announcements_fan_out_to_every_user() {
    let store = store();
    let identity = IdentityRepository::new(store.clone());
    let messages = MessagingRepository::new(store.clone());

    let u1 = identity.create("u1", "u1@example.com", "one").await.unwrap();
    let u2 = identity.create("u2", "u2@example.com", "two").await.unwrap();

    messages
        .send_announcement("toko tutup besok", &[u1, u2])
        .await
        .unwrap();

    for uid in ["u1", "u2"] {
        let inbox = messages.subscribe(uid).current();
        assert_eq!(inbox.len(), 1, "inbox of {uid}");
        assert_eq!(
            inbox[0].text,
            format!("{ANNOUNCEMENT_PREFIX} toko tutup besok")
        );
    }
}

#[tokio::test]
async fn buttons_round_trip() {
    let store = store();
    let buttons = ButtonsRepository::new(store.clone());

    let id = buttons
        .add(&CustomButton {
            id: String::new(),
            name: "Discord".to_string(),
            url: "https://discord.gg/toko".to_string(),
            icon: "discord".to_string(),
            is_active: true,
        })
        .await
        .unwrap();

    let all = buttons.subscribe().current();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, id);
    assert_eq!(all[0].name, "Discord");

    buttons.delete(&id).await.unwrap();
    assert!(buttons.subscribe().current().is_empty());
}

#[tokio::test]
async fn the_ledger_feed_filters_by_user_and_sorts_newest_first() {
    let store = store();
    let ledger = PurchaseLedger::new(store.clone());

    let first = ledger
        .create("u1", NewPurchase::mystery_box())
        .await
        .unwrap();
    ledger
        .create("u2", NewPurchase::mystery_box())
        .await
        .unwrap();
    let last = ledger
        .create("u1", NewPurchase::mystery_box())
        .await
        .unwrap();

    let mine = ledger.subscribe(Some("u1")).current();
    assert_eq!(mine.len(), 2);
    assert_eq!(mine[0].id, last, "newest first");
    assert_eq!(mine[1].id, first);
    assert!(mine.iter().all(|item| item.user_id == "u1"));

    let everyone = ledger.subscribe(None).current();
    assert_eq!(everyone.len(), 3);
}
