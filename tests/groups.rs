//! Group, membership and page rules exercised through the service layer.

mod common;

use common::TestApp;

use cohort::error::Error;
use cohort::service::groups::{self, GroupInput};
use cohort::service::pages::{self, PageInput};
use cohort::store::Store;
use cohort::types::{Page, Role};

fn group_input(name: &str) -> GroupInput {
    GroupInput {
        name: name.to_string(),
        ..Default::default()
    }
}

fn page_input(title: &str) -> PageInput {
    PageInput {
        title: title.to_string(),
        ..Default::default()
    }
}

#[test]
fn test_creator_becomes_sole_admin() {
    let app = TestApp::new();
    let alice = app.create_user("alice");

    let group = groups::create_group(app.store.as_ref(), &alice, &group_input("Eng")).unwrap();

    assert_eq!(app.store.count_admins(&group.id).unwrap(), 1);
    let member = app.store.get_member(&group.id, &alice.id).unwrap().unwrap();
    assert_eq!(member.role, Role::Admin);

    let detail = groups::get_group(app.store.as_ref(), &alice, &group.id).unwrap();
    assert_eq!(detail.role, Role::Admin);
    assert_eq!(detail.members.len(), 1);
    assert!(detail.pages.is_empty());
}

#[test]
fn test_sole_admin_cannot_leave_or_remove_self() {
    let app = TestApp::new();
    let alice = app.create_user("alice");
    let group = groups::create_group(app.store.as_ref(), &alice, &group_input("Eng")).unwrap();

    let err = groups::remove_member(app.store.as_ref(), &alice, &group.id, &alice.id).unwrap_err();
    assert!(matches!(err, Error::LastAdminGuard));

    let err = groups::leave_group(app.store.as_ref(), &alice, &group.id).unwrap_err();
    assert!(matches!(err, Error::LastAdminGuard));

    let err = groups::set_member_role(app.store.as_ref(), &alice, &group.id, &alice.id, Role::Member)
        .unwrap_err();
    assert!(matches!(err, Error::LastAdminGuard));

    let member = app.store.get_member(&group.id, &alice.id).unwrap().unwrap();
    assert_eq!(member.role, Role::Admin);
}

#[test]
fn test_admin_can_leave_once_another_admin_exists() {
    let app = TestApp::new();
    let alice = app.create_user("alice");
    let bob = app.create_user("bob");
    let group = groups::create_group(app.store.as_ref(), &alice, &group_input("Eng")).unwrap();

    let member = groups::add_member(app.store.as_ref(), &alice, &group.id, &bob.id).unwrap();
    assert_eq!(member.role, Role::Member);

    let promoted =
        groups::set_member_role(app.store.as_ref(), &alice, &group.id, &bob.id, Role::Admin)
            .unwrap();
    assert_eq!(promoted.role, Role::Admin);

    groups::leave_group(app.store.as_ref(), &alice, &group.id).unwrap();
    assert!(app.store.get_member(&group.id, &alice.id).unwrap().is_none());
    assert_eq!(app.store.count_admins(&group.id).unwrap(), 1);
}

#[test]
fn test_member_management_requires_admin() {
    let app = TestApp::new();
    let alice = app.create_user("alice");
    let bob = app.create_user("bob");
    let carol = app.create_user("carol");
    let group = groups::create_group(app.store.as_ref(), &alice, &group_input("Eng")).unwrap();
    groups::add_member(app.store.as_ref(), &alice, &group.id, &bob.id).unwrap();

    let err = groups::add_member(app.store.as_ref(), &bob, &group.id, &carol.id).unwrap_err();
    assert!(matches!(err, Error::NotAuthorized));

    let err = groups::add_member(app.store.as_ref(), &carol, &group.id, &carol.id).unwrap_err();
    assert!(matches!(err, Error::NotAMember));

    let err = groups::add_member(app.store.as_ref(), &alice, &group.id, "no-such-user").unwrap_err();
    assert!(matches!(err, Error::NotFound));

    let err = groups::add_member(app.store.as_ref(), &alice, &group.id, &bob.id).unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));

    let err = groups::remove_member(app.store.as_ref(), &alice, &group.id, &carol.id).unwrap_err();
    assert!(matches!(err, Error::NotFound));
}

#[test]
fn test_page_logos_follow_hierarchy() {
    let app = TestApp::new();
    let alice = app.create_user("alice");

    let eng = groups::create_group(
        app.store.as_ref(),
        &alice,
        &GroupInput {
            name: "Eng".to_string(),
            logo_url: Some("https://cdn.example.com/eng.png".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    let frontend = groups::create_group(
        app.store.as_ref(),
        &alice,
        &GroupInput {
            name: "Frontend".to_string(),
            logo_url: Some("https://cdn.example.com/fe.png".to_string()),
            parent_group_id: Some(eng.id.clone()),
            ..Default::default()
        },
    )
    .unwrap();

    let handbook =
        pages::create_page(app.store.as_ref(), &alice, &eng.id, &page_input("Handbook")).unwrap();
    assert_eq!(handbook.parent_group_logo_url, None);
    assert_eq!(
        handbook.child_group_logo_url.as_deref(),
        Some("https://cdn.example.com/fe.png")
    );

    let guide =
        pages::create_page(app.store.as_ref(), &alice, &frontend.id, &page_input("Guide")).unwrap();
    assert_eq!(
        guide.parent_group_logo_url.as_deref(),
        Some("https://cdn.example.com/eng.png")
    );
    assert_eq!(guide.child_group_logo_url, None);

    let listed = groups::list_groups_for_user(app.store.as_ref(), &alice).unwrap();
    let eng_entry = listed.iter().find(|g| g.group.id == eng.id).unwrap();
    assert_eq!(eng_entry.page_count, 1);
    assert_eq!(eng_entry.children.len(), 1);
    assert_eq!(eng_entry.children[0].name, "Frontend");

    let fe_entry = listed.iter().find(|g| g.group.id == frontend.id).unwrap();
    assert_eq!(fe_entry.parent.as_ref().unwrap().name, "Eng");

    let titles: Vec<_> = pages::list_pages(app.store.as_ref(), &alice, &eng.id)
        .unwrap()
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(titles, vec!["Handbook".to_string()]);
}

#[test]
fn test_unchanged_update_reads_back_identical() {
    let app = TestApp::new();
    let alice = app.create_user("alice");
    let group = groups::create_group(app.store.as_ref(), &alice, &group_input("Eng")).unwrap();

    let input = PageInput {
        title: "T".to_string(),
        description: Some("D".to_string()),
        cover_photo_url: None,
    };
    let created = pages::create_page(app.store.as_ref(), &alice, &group.id, &input).unwrap();
    pages::update_page(app.store.as_ref(), &alice, &created.id, &input).unwrap();

    // Stored timestamps keep microsecond precision.
    let read_back = pages::get_page(app.store.as_ref(), &alice, &created.id).unwrap();
    assert_eq!(
        read_back.created_at.timestamp_micros(),
        created.created_at.timestamp_micros()
    );
    assert_eq!(
        Page {
            created_at: created.created_at,
            updated_at: created.updated_at,
            ..read_back
        },
        created
    );
}

#[test]
fn test_pages_hidden_from_non_members() {
    let app = TestApp::new();
    let alice = app.create_user("alice");
    let mallory = app.create_user("mallory");

    let group = groups::create_group(app.store.as_ref(), &alice, &group_input("Eng")).unwrap();
    let page =
        pages::create_page(app.store.as_ref(), &alice, &group.id, &page_input("Handbook")).unwrap();

    let err = pages::get_page(app.store.as_ref(), &mallory, &page.id).unwrap_err();
    assert!(matches!(err, Error::NotFound));

    let err = pages::list_pages(app.store.as_ref(), &mallory, &group.id).unwrap_err();
    assert!(matches!(err, Error::NotFound));

    let err = pages::get_page(app.store.as_ref(), &alice, "missing").unwrap_err();
    assert!(matches!(err, Error::NotFound));
}

#[test]
fn test_page_round_trip() {
    let app = TestApp::new();
    let alice = app.create_user("alice");
    let bob = app.create_user("bob");
    let group = groups::create_group(app.store.as_ref(), &alice, &group_input("Eng")).unwrap();
    groups::add_member(app.store.as_ref(), &alice, &group.id, &bob.id).unwrap();

    let page = pages::create_page(
        app.store.as_ref(),
        &alice,
        &group.id,
        &PageInput {
            title: "  Handbook  ".to_string(),
            description: Some("How we work".to_string()),
            cover_photo_url: None,
        },
    )
    .unwrap();
    assert_eq!(page.title, "Handbook");

    let fetched = pages::get_page(app.store.as_ref(), &bob, &page.id).unwrap();
    assert_eq!(fetched.title, "Handbook");
    assert_eq!(fetched.description.as_deref(), Some("How we work"));

    let err = pages::update_page(app.store.as_ref(), &bob, &page.id, &page_input("Mine"))
        .unwrap_err();
    assert!(matches!(err, Error::NotAuthorized));

    let updated =
        pages::update_page(app.store.as_ref(), &alice, &page.id, &page_input("Playbook")).unwrap();
    assert_eq!(updated.title, "Playbook");
    assert_eq!(updated.description, None);

    let listed = pages::list_pages(app.store.as_ref(), &bob, &group.id).unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Playbook");

    let err = pages::create_page(app.store.as_ref(), &alice, &group.id, &page_input("   "))
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn test_delete_page_and_group() {
    let app = TestApp::new();
    let alice = app.create_user("alice");
    let group = groups::create_group(app.store.as_ref(), &alice, &group_input("Eng")).unwrap();
    let child = groups::create_group(
        app.store.as_ref(),
        &alice,
        &GroupInput {
            name: "Frontend".to_string(),
            parent_group_id: Some(group.id.clone()),
            ..Default::default()
        },
    )
    .unwrap();
    let page =
        pages::create_page(app.store.as_ref(), &alice, &group.id, &page_input("Handbook")).unwrap();

    pages::delete_page(app.store.as_ref(), app.storage(), &alice, &page.id)
        .await
        .unwrap();
    assert!(app.store.get_page(&page.id).unwrap().is_none());

    groups::delete_group(app.store.as_ref(), app.storage(), &alice, &group.id)
        .await
        .unwrap();
    assert!(app.store.get_group(&group.id).unwrap().is_none());

    let orphan = app.store.get_group(&child.id).unwrap().unwrap();
    assert_eq!(orphan.parent_group_id, None);
}

#[test]
fn test_parent_rules() {
    let app = TestApp::new();
    let alice = app.create_user("alice");
    let mallory = app.create_user("mallory");

    let root = groups::create_group(app.store.as_ref(), &alice, &group_input("Root")).unwrap();
    let child = groups::create_group(
        app.store.as_ref(),
        &alice,
        &GroupInput {
            name: "Child".to_string(),
            parent_group_id: Some(root.id.clone()),
            ..Default::default()
        },
    )
    .unwrap();

    // Root under its own child
    let err = groups::update_group(
        app.store.as_ref(),
        &alice,
        &root.id,
        &GroupInput {
            name: "Root".to_string(),
            parent_group_id: Some(child.id.clone()),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let err = groups::update_group(
        app.store.as_ref(),
        &alice,
        &root.id,
        &GroupInput {
            name: "Root".to_string(),
            parent_group_id: Some(root.id.clone()),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    // A parent the caller does not belong to looks missing
    let err = groups::create_group(
        app.store.as_ref(),
        &mallory,
        &GroupInput {
            name: "Sneaky".to_string(),
            parent_group_id: Some(root.id.clone()),
            ..Default::default()
        },
    )
    .unwrap_err();
    assert!(matches!(err, Error::Validation(ref m) if m == "Parent group not found"));

    let unchanged = app.store.get_group(&root.id).unwrap().unwrap();
    assert_eq!(unchanged.parent_group_id, None);
}
