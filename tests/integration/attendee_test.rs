use crate::common::*;
use entity::sea_orm_active_enums::UserRole;
use studiobook::{
    models::{attendees::AttendeeSource, invitations::InvitationDecision},
    services::{AttendeeService, BookingService, InvitationService, SubscriptionService},
    ApiError,
};

#[tokio::test]
async fn test_roster_merges_direct_and_invited_attendees() {
    let db = setup_db().await;
    let (instructor, _, class) = create_instructor_class(&db, 2, 10).await;
    let direct = create_customer(&db, "Ana", 5).await;
    let invited = create_customer(&db, "Ben", 5).await;

    BookingService::new(db.clone())
        .book(direct.id, class.id)
        .await
        .unwrap();

    SubscriptionService::new(db.clone())
        .subscribe(instructor.id, invited.id)
        .await
        .unwrap();
    let invitations = InvitationService::new(db.clone(), 7);
    let invitation = invitations
        .create_invitation(instructor.id, invited.id, class.id, None)
        .await
        .unwrap();
    invitations
        .respond(invited.id, invitation.id, InvitationDecision::Accepted)
        .await
        .unwrap();

    let roster = AttendeeService::new(db.clone())
        .list_attendees(instructor.id, UserRole::Instructor, class.id)
        .await
        .unwrap();

    assert_eq!(roster.len(), 2);
    let ana = roster.iter().find(|a| a.user_id == direct.id).unwrap();
    assert_eq!(ana.source, AttendeeSource::Booking);
    let ben = roster.iter().find(|a| a.user_id == invited.id).unwrap();
    assert_eq!(ben.source, AttendeeSource::Invitation);
    assert_eq!(ben.credits_used, 2);
}

#[tokio::test]
async fn test_roster_is_restricted_to_owner_and_admin() {
    let db = setup_db().await;
    let (_, _, class) = create_instructor_class(&db, 1, 10).await;
    let other = create_instructor(&db, "Omar").await;
    let customer = create_customer(&db, "Ana", 0).await;
    let admin = create_user(&db, "Root", UserRole::Admin).await;
    let service = AttendeeService::new(db.clone());

    assert!(matches!(
        service
            .list_attendees(other.id, UserRole::Instructor, class.id)
            .await,
        Err(ApiError::NotOwner(_))
    ));
    assert!(matches!(
        service
            .list_attendees(customer.id, UserRole::Customer, class.id)
            .await,
        Err(ApiError::Forbidden(_))
    ));
    assert!(service
        .list_attendees(admin.id, UserRole::Admin, class.id)
        .await
        .unwrap()
        .is_empty());
}
