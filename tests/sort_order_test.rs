mod common;

use vault_core::platforms::{NewPlatform, Platform, PlatformRepositoryTrait, PlatformType};

fn new_platform(name: &str) -> NewPlatform {
    NewPlatform {
        name: name.to_string(),
        platform_type: None,
    }
}

#[tokio::test]
async fn insert_at_top_bumps_every_existing_platform() {
    let vault = common::setup();

    vault.platforms.insert_at_top(new_platform("mail")).await.unwrap();
    vault.platforms.insert_at_top(new_platform("bank")).await.unwrap();

    let before = vault.platforms.list().unwrap();
    assert_eq!(
        before.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        vec!["bank", "mail"]
    );
    assert_eq!(
        before.iter().map(|p| p.sort_index).collect::<Vec<_>>(),
        vec![0, 1]
    );

    vault.platforms.insert_at_top(new_platform("shop")).await.unwrap();

    let after = vault.platforms.list().unwrap();
    assert_eq!(after[0].name, "shop");
    assert_eq!(after[0].sort_index, 0);
    // Every pre-existing platform moved down by exactly one.
    for p in &before {
        let bumped = after.iter().find(|q| q.id == p.id).unwrap();
        assert_eq!(bumped.sort_index, p.sort_index + 1);
    }
}

#[tokio::test]
async fn final_order_is_a_pure_function_of_the_last_batch() {
    let vault = common::setup();

    for name in ["a", "b", "c"] {
        vault.platforms.insert_at_top(new_platform(name)).await.unwrap();
    }
    let ids: Vec<i32> = vault.platforms.list().unwrap().iter().map(|p| p.id).collect();
    let (a, b, c) = (ids[2], ids[1], ids[0]); // insertion order was a, b, c

    vault.platforms.update_sort_indices(vec![c, a, b]).await.unwrap();
    vault.platforms.update_sort_indices(vec![b, c, a]).await.unwrap();

    let listed: Vec<i32> = vault.platforms.list().unwrap().iter().map(|p| p.id).collect();
    assert_eq!(listed, vec![b, c, a]);
    for (position, id) in [b, c, a].iter().enumerate() {
        let p = vault.platforms.get_by_id(*id).unwrap();
        assert_eq!(p.sort_index, position as i32);
    }
}

#[tokio::test]
async fn reapplying_the_same_batch_is_idempotent() {
    let vault = common::setup();

    for name in ["a", "b", "c"] {
        vault.platforms.insert_at_top(new_platform(name)).await.unwrap();
    }
    let ids: Vec<i32> = vault.platforms.list().unwrap().iter().map(|p| p.id).collect();
    let order = vec![ids[2], ids[0], ids[1]];

    vault.platforms.update_sort_indices(order.clone()).await.unwrap();
    let once = vault.platforms.list().unwrap();

    vault.platforms.update_sort_indices(order).await.unwrap();
    let twice = vault.platforms.list().unwrap();

    assert_eq!(once, twice);
}

#[tokio::test]
async fn sort_index_ties_break_by_id_ascending() {
    let vault = common::setup();

    // Plain saves leave both rows at sort_index 0.
    for name in ["second", "first"] {
        vault
            .platforms
            .save(Platform {
                id: 0,
                name: name.to_string(),
                platform_type: None,
                sort_index: 0,
            })
            .await
            .unwrap();
    }

    let listed = vault.platforms.list().unwrap();
    assert_eq!(listed[0].name, "second"); // inserted first, smaller id
    assert_eq!(listed[1].name, "first");
    assert!(listed[0].id < listed[1].id);
}

#[tokio::test]
async fn distinct_types_are_listed_once() {
    let vault = common::setup();

    for (name, t) in [
        ("mail", Some(PlatformType::Work)),
        ("bank", Some(PlatformType::Finance)),
        ("office", Some(PlatformType::Work)),
        ("misc", None),
    ] {
        vault
            .platforms
            .insert_at_top(NewPlatform {
                name: name.to_string(),
                platform_type: t,
            })
            .await
            .unwrap();
    }

    let types = vault.platforms.list_types().unwrap();
    assert_eq!(types.len(), 2);
    assert!(types.contains(&PlatformType::Work));
    assert!(types.contains(&PlatformType::Finance));
}
