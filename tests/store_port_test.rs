use assetledger::application::engine::LedgerEngine;
use assetledger::domain::ids::{AccountId, Amount, AssetId};
use assetledger::domain::ledger::Changeset;
use assetledger::domain::ports::{LedgerStoreBox, LedgerStoreFactory};
use assetledger::infrastructure::clock::FixedClock;
use assetledger::infrastructure::in_memory::InMemoryLedgerStore;

#[tokio::test]
async fn test_store_as_trait_object() {
    let store: LedgerStoreBox = Box::new(InMemoryLedgerStore::new());
    let genesis = Changeset {
        administrator: Some(AccountId::new("admin").unwrap()),
        ..Default::default()
    };

    // Verify Send + Sync by spawning a task
    let handle = tokio::spawn(async move {
        store.commit(&genesis).await.unwrap();
        store.load().await.unwrap().unwrap()
    });

    let snapshot = handle.await.unwrap();
    assert_eq!(snapshot.administrator.as_str(), "admin");
}

#[tokio::test]
async fn test_factory_instantiation() {
    let factory: LedgerStoreFactory =
        Box::new(|| Box::new(InMemoryLedgerStore::new()) as LedgerStoreBox);

    // Every store from the factory backs an independent ledger
    let asset = AssetId::symbol("T").unwrap();
    let first = LedgerEngine::open(factory(), AccountId::new("a").unwrap(), FixedClock(0))
        .await
        .unwrap();
    let second = LedgerEngine::open(factory(), AccountId::new("b").unwrap(), FixedClock(0))
        .await
        .unwrap();

    first
        .add_eligible_asset(AccountId::new("a").unwrap(), asset)
        .await
        .unwrap();
    first
        .deposit(AccountId::new("u1").unwrap(), Amount::new(9), asset)
        .await
        .unwrap();

    assert!(!second.is_eligible(asset).await.unwrap());
    assert_eq!(
        second
            .balance_of(AccountId::new("u1").unwrap(), asset)
            .await
            .unwrap(),
        Amount::ZERO
    );
    assert_eq!(second.administrator().await.unwrap().as_str(), "b");
}
