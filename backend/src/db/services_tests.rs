use chrono::{Days, NaiveDate};

use super::repositories::LocalRepository;
use super::repository::{RepositoryError, TemplateRepository};
use super::services::*;
use crate::models::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn days_before(day: NaiveDate, n: u64) -> NaiveDate {
    day.checked_sub_days(Days::new(n)).unwrap()
}

async fn friday_template(repo: &LocalRepository) -> TemplateId {
    let template = EventTemplate::new("Friday dinner", RecurrenceRule::weekly(5));
    store_template(repo, &template).await.unwrap().id.unwrap()
}

async fn contact(repo: &LocalRepository, first: &str) -> ContactId {
    store_contact(repo, &Contact::new(first, "Doe"))
        .await
        .unwrap()
        .id
        .unwrap()
}

#[tokio::test]
async fn test_generate_slots_is_idempotent() {
    let repo = LocalRepository::new();
    let id = friday_template(&repo).await;
    let today = date(2024, 6, 3);

    let first = generate_slots(&repo, id, today, 1).await.unwrap();
    assert_eq!(first.candidates, 4);
    assert_eq!(first.created, 4);
    assert_eq!(first.skipped_existing, 0);
    assert_eq!(first.created_slots[0].date, date(2024, 6, 7));
    assert!(first
        .created_slots
        .iter()
        .all(|s| s.status == SlotStatus::Available));

    let second = generate_slots(&repo, id, today, 1).await.unwrap();
    assert_eq!(second.candidates, 4);
    assert_eq!(second.created, 0);
    assert_eq!(second.skipped_existing, 4);
    assert_eq!(repo.slot_count(), 4);
}

#[tokio::test]
async fn test_generate_slots_extends_horizon_without_touching_existing() {
    let repo = LocalRepository::new();
    let id = friday_template(&repo).await;
    let today = date(2024, 6, 3);

    let slots = generate_slots(&repo, id, today, 1).await.unwrap().created_slots;
    let assigned = slots[0].id.unwrap();
    update_slot_status(&repo, assigned, SlotStatus::Assigned)
        .await
        .unwrap();

    let report = generate_slots(&repo, id, today, 2).await.unwrap();
    assert_eq!(report.skipped_existing, 4);
    assert_eq!(report.created, report.candidates - 4);

    let stored = list_slots(&repo, id).await.unwrap();
    assert_eq!(stored.len(), report.candidates);
    assert_eq!(stored[0].status, SlotStatus::Assigned);
    assert!(stored.windows(2).all(|w| w[0].date < w[1].date));
}

#[tokio::test]
async fn test_generate_slots_unknown_template() {
    let repo = LocalRepository::new();
    let err = generate_slots(&repo, TemplateId(99), date(2024, 6, 3), 3)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.context().operation.as_deref(), Some("generate_slots"));
}

#[tokio::test]
async fn test_generate_slots_propagates_connection_errors() {
    let repo = LocalRepository::new();
    let id = friday_template(&repo).await;
    repo.set_healthy(false);

    let err = generate_slots(&repo, id, date(2024, 6, 3), 1)
        .await
        .unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_inactive_template_generates_nothing() {
    let repo = LocalRepository::new();
    let mut template = EventTemplate::new("Paused", RecurrenceRule::weekly(1));
    template.active = false;
    let id = store_template(&repo, &template).await.unwrap().id.unwrap();

    let report = generate_slots(&repo, id, date(2024, 6, 3), 3).await.unwrap();
    assert_eq!(report.candidates, 0);
    assert_eq!(repo.slot_count(), 0);
}

#[tokio::test]
async fn test_create_slot_if_absent() {
    let repo = LocalRepository::new();
    let id = friday_template(&repo).await;
    let candidate = SlotCandidate {
        date: date(2024, 6, 7),
        time: None,
    };

    let first = create_slot_if_absent(&repo, id, candidate).await.unwrap();
    assert!(matches!(first, SlotInsertOutcome::Created(_)));
    let second = create_slot_if_absent(&repo, id, candidate).await.unwrap();
    assert_eq!(second, SlotInsertOutcome::AlreadyExists);

    let err = create_slot_if_absent(&repo, TemplateId(42), candidate)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_preview_does_not_write() {
    let repo = LocalRepository::new();
    let id = friday_template(&repo).await;

    let preview = preview_slots(&repo, id, date(2024, 6, 3), 1).await.unwrap();
    assert_eq!(preview.len(), 4);
    assert_eq!(repo.slot_count(), 0);
}

#[tokio::test]
async fn test_generate_all_slots_skips_inactive() {
    let repo = LocalRepository::new();
    friday_template(&repo).await;
    let mut paused = EventTemplate::new("Paused", RecurrenceRule::weekly(1));
    paused.active = false;
    store_template(&repo, &paused).await.unwrap();

    let reports = generate_all_slots(&repo, date(2024, 6, 3), 1).await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].created, 4);
}

#[tokio::test]
async fn test_store_template_rejects_malformed_rule() {
    let repo = LocalRepository::new();

    let mut rule = RecurrenceRule::monthly_on_day(15);
    rule.week_of_month = Some(2);
    let err = store_template(&repo, &EventTemplate::new("Ambiguous", rule))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));

    let err = store_template(&repo, &EventTemplate::new("  ", RecurrenceRule::weekly(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
    assert_eq!(repo.template_count(), 0);
}

#[tokio::test]
async fn test_contact_score() {
    let repo = LocalRepository::new();
    let now = date(2024, 6, 3);
    let alice = contact(&repo, "Alice").await;

    assert_eq!(
        contact_score(&repo, alice, now).await.unwrap(),
        ScoreResult::NO_DATA
    );

    store_interaction(&repo, &Interaction::with_contact(alice, "call", now))
        .await
        .unwrap();
    let result = contact_score(&repo, alice, now).await.unwrap();
    assert_eq!(result.score, 62);
    assert_eq!(result.label, ScoreTier::Good);

    let err = contact_score(&repo, ContactId(404), now).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_family_score() {
    let repo = LocalRepository::new();
    let now = date(2024, 6, 3);
    let family = store_family(
        &repo,
        &Family {
            id: None,
            name: "Doe".into(),
        },
    )
    .await
    .unwrap()
    .id
    .unwrap();

    store_interaction(
        &repo,
        &Interaction::with_family(family, "visit", days_before(now, 3)),
    )
    .await
    .unwrap();

    let result = family_score(&repo, family, now).await.unwrap();
    assert_eq!(result.recency, 91);
    assert_eq!(result.score, 58);
}

#[tokio::test]
async fn test_family_score_unknown_family_is_not_found() {
    let repo = LocalRepository::new();
    let err = family_score(&repo, FamilyId(404), date(2024, 6, 3))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.context().operation.as_deref(), Some("get_family"));
}

#[tokio::test]
async fn test_group_score_fallback_and_ranking() {
    let repo = LocalRepository::new();
    let now = date(2024, 6, 3);
    let alice = contact(&repo, "Alice").await;

    let mut quiet = InviteGroup::new("Book club");
    quiet.member_ids = vec![alice];
    let quiet = store_group(&repo, &quiet).await.unwrap().id.unwrap();
    let active = store_group(&repo, &InviteGroup::new("Climbing"))
        .await
        .unwrap()
        .id
        .unwrap();
    let empty = store_group(&repo, &InviteGroup::new("Alumni"))
        .await
        .unwrap()
        .id
        .unwrap();

    store_interaction(&repo, &Interaction::with_contact(alice, "call", now))
        .await
        .unwrap();
    store_interaction(
        &repo,
        &Interaction::with_group(active, "visit", days_before(now, 3)),
    )
    .await
    .unwrap();

    let (fallback, source) = group_score_with_source(&repo, quiet, now).await.unwrap();
    assert_eq!(source, ScoreSource::Fallback);
    assert_eq!(fallback.score, 31);
    assert_eq!(fallback.label, ScoreTier::Weak);
    assert_eq!(fallback.recency, 100);

    let direct = group_score(&repo, active, now).await.unwrap();
    assert_eq!(direct.score, 58);

    assert_eq!(
        group_score(&repo, GroupId(999), now).await.unwrap(),
        ScoreResult::NO_DATA
    );

    let ranked = group_scores(&repo, now).await.unwrap();
    let order: Vec<GroupId> = ranked.iter().map(|g| g.group_id).collect();
    assert_eq!(order, vec![empty, quiet, active]);
    assert_eq!(ranked[0].source, ScoreSource::None);
    assert_eq!(ranked[2].source, ScoreSource::Direct);
}

#[tokio::test]
async fn test_group_direct_events_win_over_fallback() {
    let repo = LocalRepository::new();
    let now = date(2024, 6, 3);
    let alice = contact(&repo, "Alice").await;

    let mut group = InviteGroup::new("Neighbours");
    group.member_ids = vec![alice];
    let group = store_group(&repo, &group).await.unwrap().id.unwrap();

    store_interaction(&repo, &Interaction::with_contact(alice, "call", now))
        .await
        .unwrap();
    store_interaction(
        &repo,
        &Interaction::with_group(group, "dinner", days_before(now, 80)),
    )
    .await
    .unwrap();

    let (result, source) = group_score_with_source(&repo, group, now).await.unwrap();
    assert_eq!(source, ScoreSource::Direct);
    assert!(result.score < 31);
}

#[tokio::test]
async fn test_attention_dashboard() {
    let repo = LocalRepository::new();
    let today = date(2024, 6, 3);

    let mut bob = Contact::new("Bob", "Stone");
    bob.birthday = Some(date(1990, 6, 10));
    let bob = store_contact(&repo, &bob).await.unwrap().id.unwrap();
    let mut carol = Contact::new("Carol", "Stone");
    carol.birthday = Some(date(1985, 8, 1));
    let carol = store_contact(&repo, &carol).await.unwrap().id.unwrap();
    let dave = contact(&repo, "Dave").await;

    let birthdays = upcoming_birthdays(&repo, today, 14).await.unwrap();
    assert_eq!(birthdays.len(), 1);
    assert_eq!(birthdays[0].contact_id, bob);
    assert_eq!(birthdays[0].days_until, 7);

    store_interaction(
        &repo,
        &Interaction::with_contact(bob, "call", days_before(today, 60)),
    )
    .await
    .unwrap();
    store_interaction(
        &repo,
        &Interaction::with_contact(carol, "call", days_before(today, 3)),
    )
    .await
    .unwrap();

    let neglected = neglected_contacts(&repo, today, 4, 5).await.unwrap();
    let ids: Vec<ContactId> = neglected.iter().map(|n| n.contact_id).collect();
    assert_eq!(ids, vec![dave, bob]);
    assert_eq!(neglected[1].days_since_contact, Some(60));

    let top = neglected_contacts(&repo, today, 4, 1).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].contact_id, dave);
}

#[tokio::test]
async fn test_store_validation() {
    let repo = LocalRepository::new();
    assert!(store_contact(&repo, &Contact::new("", "Doe")).await.is_err());
    assert!(store_group(&repo, &InviteGroup::new("")).await.is_err());

    let alice = contact(&repo, "Alice").await;
    let err = store_interaction(&repo, &Interaction::with_contact(alice, " ", date(2024, 1, 1)))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));
}

async fn family_with_members(repo: &LocalRepository, name: &str, members: &[&str]) -> FamilyId {
    let family = store_family(
        repo,
        &Family {
            id: None,
            name: name.into(),
        },
    )
    .await
    .unwrap()
    .id
    .unwrap();
    for first in members {
        let mut member = Contact::new(*first, name);
        member.family_id = Some(family);
        store_contact(repo, &member).await.unwrap();
    }
    family
}

#[tokio::test]
async fn test_assign_contacts_marks_slot_assigned() {
    let repo = LocalRepository::new();
    let id = friday_template(&repo).await;
    let slot = generate_slots(&repo, id, date(2024, 6, 3), 1)
        .await
        .unwrap()
        .created_slots[0]
        .id
        .unwrap();
    let alice = contact(&repo, "Alice").await;
    let family = family_with_members(&repo, "Kim", &["Min", "Jun"]).await;
    let empty_family = family_with_members(&repo, "Ghost", &[]).await;

    let updated = assign_contacts_to_slot(&repo, slot, &[alice], &[family, empty_family])
        .await
        .unwrap();
    assert_eq!(updated.status, SlotStatus::Assigned);

    let attendees = repo.slot_attendees(slot).await.unwrap();
    assert_eq!(attendees.len(), 2);
    assert_eq!(attendees[0], SlotAttendee::contact(alice));
    // Min was stored first, so she represents the family
    assert_eq!(attendees[1].contact_id, ContactId(alice.value() + 1));
    assert_eq!(attendees[1].family_id, Some(family));

    let err = assign_contacts_to_slot(&repo, SlotId(404), &[alice], &[])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_removing_last_contact_frees_slot() {
    let repo = LocalRepository::new();
    let id = friday_template(&repo).await;
    let slot = generate_slots(&repo, id, date(2024, 6, 3), 1)
        .await
        .unwrap()
        .created_slots[0]
        .id
        .unwrap();
    let alice = contact(&repo, "Alice").await;
    let bob = contact(&repo, "Bob").await;
    assign_contacts_to_slot(&repo, slot, &[alice, bob], &[])
        .await
        .unwrap();

    let still = remove_contact_from_slot(&repo, slot, alice).await.unwrap();
    assert_eq!(still.status, SlotStatus::Assigned);

    let freed = remove_contact_from_slot(&repo, slot, bob).await.unwrap();
    assert_eq!(freed.status, SlotStatus::Available);

    let err = remove_contact_from_slot(&repo, slot, bob).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_assign_groups_to_slot() {
    let repo = LocalRepository::new();
    let id = friday_template(&repo).await;
    let slot = generate_slots(&repo, id, date(2024, 6, 3), 1)
        .await
        .unwrap()
        .created_slots[0]
        .id
        .unwrap();
    let group = store_group(&repo, &InviteGroup::new("Climbing"))
        .await
        .unwrap()
        .id
        .unwrap();

    let unchanged = assign_groups_to_slot(&repo, slot, &[]).await.unwrap();
    assert_eq!(unchanged.status, SlotStatus::Available);

    let updated = assign_groups_to_slot(&repo, slot, &[group]).await.unwrap();
    assert_eq!(updated.status, SlotStatus::Assigned);
    assert_eq!(repo.slot_groups(slot).await.unwrap(), vec![group]);

    let err = assign_groups_to_slot(&repo, slot, &[GroupId(77)])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_upcoming_slots_report_capacity() {
    let repo = LocalRepository::new();
    let today = date(2024, 6, 3);
    let dinner = EventTemplate::new(
        "Dinner",
        RecurrenceRule::weekly(5).with_max_attendees(3),
    );
    let dinner = store_template(&repo, &dinner).await.unwrap().id.unwrap();
    let mut paused = EventTemplate::new("Paused", RecurrenceRule::weekly(2));
    paused.active = false;
    let paused = store_template(&repo, &paused).await.unwrap().id.unwrap();

    let slots = generate_slots(&repo, dinner, today, 1)
        .await
        .unwrap()
        .created_slots;
    create_slot_if_absent(
        &repo,
        paused,
        SlotCandidate {
            date: date(2024, 6, 4),
            time: None,
        },
    )
    .await
    .unwrap();
    create_slot_if_absent(
        &repo,
        dinner,
        SlotCandidate {
            date: date(2024, 5, 31),
            time: None,
        },
    )
    .await
    .unwrap();

    let alice = contact(&repo, "Alice").await;
    assign_contacts_to_slot(&repo, slots[0].id.unwrap(), &[alice], &[])
        .await
        .unwrap();

    let upcoming = upcoming_slots(&repo, today, 2).await.unwrap();
    assert_eq!(upcoming.len(), 2);
    assert_eq!(upcoming[0].slot.date, date(2024, 6, 7));
    assert_eq!(upcoming[0].template_name, "Dinner");
    assert_eq!(upcoming[0].attendee_count, 1);
    assert_eq!(upcoming[0].available_spots, 2);
    assert_eq!(upcoming[1].slot.date, date(2024, 6, 14));
    assert_eq!(upcoming[1].available_spots, 3);
}

#[tokio::test]
async fn test_complete_reminder_repeats_or_closes() {
    let repo = LocalRepository::new();
    let today = date(2024, 6, 3);
    let weekly = create_reminder(
        &repo,
        &Reminder::new(ReminderKind::Call, "Call mum", date(2024, 6, 1))
            .repeating(RepeatInterval::Weekly),
    )
    .await
    .unwrap();
    let once = create_reminder(
        &repo,
        &Reminder::new(ReminderKind::Invite, "Invite Kims", date(2024, 6, 2)),
    )
    .await
    .unwrap();

    let next = complete_reminder(&repo, weekly.id.unwrap(), today)
        .await
        .unwrap();
    assert!(next.is_open());
    assert_eq!(next.due_date, date(2024, 6, 8));

    let closed = complete_reminder(&repo, once.id.unwrap(), today)
        .await
        .unwrap();
    assert!(closed.completed);
    assert_eq!(closed.completed_on, Some(today));

    let open = open_reminders(&repo).await.unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, weekly.id);

    let err = complete_reminder(&repo, ReminderId(99), today)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.context().operation.as_deref(), Some("complete_reminder"));
}

#[tokio::test]
async fn test_overdue_and_upcoming_reminders() {
    let repo = LocalRepository::new();
    let today = date(2024, 6, 10);
    for (title, due) in [
        ("late", date(2024, 6, 1)),
        ("later", date(2024, 6, 9)),
        ("today", today),
        ("next week", date(2024, 6, 17)),
        ("far", date(2024, 7, 1)),
    ] {
        create_reminder(&repo, &Reminder::new(ReminderKind::Custom, title, due))
            .await
            .unwrap();
    }

    let overdue = overdue_reminders(&repo, today, 5).await.unwrap();
    let titles: Vec<_> = overdue.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["late", "later"]);

    let upcoming = upcoming_reminders(&repo, today, 7, 5).await.unwrap();
    let titles: Vec<_> = upcoming.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["today", "next week"]);

    assert_eq!(upcoming_reminders(&repo, today, 7, 1).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_reminder_validation_and_delete() {
    let repo = LocalRepository::new();
    let err = create_reminder(
        &repo,
        &Reminder::new(ReminderKind::Call, "  ", date(2024, 6, 1)),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RepositoryError::ValidationError { .. }));

    let stored = create_reminder(
        &repo,
        &Reminder::new(ReminderKind::Call, "Call", date(2024, 6, 1)),
    )
    .await
    .unwrap();
    delete_reminder(&repo, stored.id.unwrap()).await.unwrap();
    assert!(delete_reminder(&repo, stored.id.unwrap())
        .await
        .unwrap_err()
        .is_not_found());
}
