use crate::common::*;
use entity::instructor_subscriptions;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use studiobook::{services::SubscriptionService, ApiError};

#[tokio::test]
async fn test_subscribe_twice_keeps_one_active_row() {
    let db = setup_db().await;
    let instructor = create_instructor(&db, "Ines").await;
    let customer = create_customer(&db, "Ana", 0).await;
    let service = SubscriptionService::new(db.clone());

    let first = service.subscribe(instructor.id, customer.id).await.unwrap();
    let second = service.subscribe(instructor.id, customer.id).await.unwrap();

    assert_eq!(first.id, second.id);
    assert!(second.is_active);

    let rows = instructor_subscriptions::Entity::find()
        .filter(instructor_subscriptions::Column::CustomerId.eq(customer.id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(rows, 1);
    assert!(service.is_subscribed(instructor.id, customer.id).await.unwrap());
}

#[tokio::test]
async fn test_unsubscribe_then_subscribe_reactivates() {
    let db = setup_db().await;
    let instructor = create_instructor(&db, "Ines").await;
    let customer = create_customer(&db, "Ana", 0).await;
    let service = SubscriptionService::new(db.clone());

    let original = service.subscribe(instructor.id, customer.id).await.unwrap();

    let inactive = service.unsubscribe(instructor.id, customer.id).await.unwrap();
    assert!(!inactive.is_active);
    assert!(inactive.unsubscribed_at.is_some());
    assert!(!service.is_subscribed(instructor.id, customer.id).await.unwrap());

    let reactivated = service.subscribe(instructor.id, customer.id).await.unwrap();
    assert_eq!(reactivated.id, original.id);
    assert!(reactivated.is_active);
    assert!(reactivated.unsubscribed_at.is_none());

    let rows = instructor_subscriptions::Entity::find().count(&db).await.unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_subscribe_requires_an_instructor() {
    let db = setup_db().await;
    let not_instructor = create_customer(&db, "Ben", 0).await;
    let customer = create_customer(&db, "Ana", 0).await;
    let service = SubscriptionService::new(db.clone());

    assert!(matches!(
        service.subscribe(not_instructor.id, customer.id).await,
        Err(ApiError::NotFound(_))
    ));

    let instructor = create_instructor(&db, "Ines").await;
    assert!(matches!(
        service.subscribe(instructor.id, instructor.id).await,
        Err(ApiError::BadRequest(_))
    ));
}

#[tokio::test]
async fn test_unsubscribe_without_row_is_not_found() {
    let db = setup_db().await;
    let instructor = create_instructor(&db, "Ines").await;
    let customer = create_customer(&db, "Ana", 0).await;

    let result = SubscriptionService::new(db.clone())
        .unsubscribe(instructor.id, customer.id)
        .await;
    assert!(matches!(result, Err(ApiError::NotFound(_))));
}

#[tokio::test]
async fn test_list_subscribers_only_active() {
    let db = setup_db().await;
    let instructor = create_instructor(&db, "Ines").await;
    let ana = create_customer(&db, "Ana", 0).await;
    let ben = create_customer(&db, "Ben", 0).await;
    let service = SubscriptionService::new(db.clone());

    service.subscribe(instructor.id, ana.id).await.unwrap();
    service.subscribe(instructor.id, ben.id).await.unwrap();
    service.unsubscribe(instructor.id, ben.id).await.unwrap();

    let subscribers = service.list_subscribers(instructor.id).await.unwrap();
    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].customer_id, ana.id);
    assert_eq!(subscribers[0].name, "Ana");
}
