//! End-to-end tests for the prompt versioning flow.

use std::sync::Arc;

use promptvault_core::storage::Storage;
use promptvault_core::{
    generate_diff, DiffOptions, ErrorCode, MemStorage, PromptStore, PromptUpdate, Vault,
    VaultConfig, VaultResult,
};

fn vault() -> Vault {
    Vault::open_in_memory().unwrap()
}

#[test]
fn test_full_lifecycle() {
    let vault = vault();
    let store = vault.store();
    let control = vault.control();

    // Create, then evolve through two content updates
    let prompt = store
        .create_prompt("Assistant", "You are helpful.", vec!["chat".to_string()], None)
        .unwrap();
    store
        .update_prompt(&prompt.id, PromptUpdate::default().content("You are terse."))
        .unwrap();
    let prompt = store
        .update_prompt(&prompt.id, PromptUpdate::default().content("You are precise."))
        .unwrap();

    let history = control.version_history(&prompt.id).unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(
        history.iter().map(|v| v.version_number).collect::<Vec<_>>(),
        vec![3, 2, 1]
    );

    // HEAD pointer consistency after every mutation
    assert_eq!(history[0].id, prompt.current_version_id);
    assert_eq!(history[0].content, prompt.content);
    assert_eq!(prompt.version_count, 3);

    // Rollback restores old content by appending
    let v1 = &history[2];
    let rollback = control.rollback_to_version(&prompt.id, &v1.id, None).unwrap();
    assert_eq!(rollback.prompt.content, "You are helpful.");
    assert_eq!(rollback.new_version.version_number, 4);
    assert!(rollback.new_version.is_rollback);
    assert_eq!(
        rollback.new_version.source_version_id.as_deref(),
        Some(v1.id.as_str())
    );
    assert_eq!(control.version_history(&prompt.id).unwrap().len(), 4);

    // Delete cascades all versions
    let removed = store.delete_prompt(&prompt.id).unwrap();
    assert_eq!(removed, 4);
    assert_eq!(
        control.version_history(&prompt.id).unwrap_err().code(),
        ErrorCode::PromptNotFound
    );
}

#[test]
fn test_head_consistency_invariant() {
    let vault = vault();
    let store = vault.store();
    let control = vault.control();

    let mut prompt = store.create_prompt("T", "step 0", vec![], None).unwrap();
    for step in 1..=5 {
        prompt = store
            .update_prompt(
                &prompt.id,
                PromptUpdate::default().content(format!("step {}", step)),
            )
            .unwrap();

        let head = control.get_version(&prompt.current_version_id).unwrap();
        assert_eq!(head.content, prompt.content);
        assert_eq!(head.version_number, prompt.version_count);
    }
    assert_eq!(prompt.version_count, 6);
}

#[test]
fn test_identical_content_update_appends_nothing() {
    let vault = vault();
    let prompt = vault
        .store()
        .create_prompt("T", "stable", vec![], None)
        .unwrap();

    for _ in 0..3 {
        let updated = vault
            .store()
            .update_prompt(&prompt.id, PromptUpdate::default().content("stable"))
            .unwrap();
        assert_eq!(updated.version_count, 1);
    }
    assert_eq!(vault.control().version_history(&prompt.id).unwrap().len(), 1);
}

#[test]
fn test_compare_versions_end_to_end() {
    let vault = vault();
    let store = vault.store();
    let control = vault.control();

    let prompt = store.create_prompt("T", "a\nb\nc", vec![], None).unwrap();
    let v1_id = prompt.current_version_id.clone();
    let updated = store
        .update_prompt(&prompt.id, PromptUpdate::default().content("a\nx\nc"))
        .unwrap();

    let comparison = control
        .compare_versions(&v1_id, &updated.current_version_id)
        .unwrap();
    assert_eq!(comparison.diff.summary.additions, 1);
    assert_eq!(comparison.diff.summary.deletions, 1);
    assert_eq!(comparison.diff.summary.unchanged, 2);
    assert_eq!(comparison.diff.summary.total_changes, 2);
    assert_eq!(comparison.diff.unified, "@@ -1,3 +1,3 @@\n a\n-b\n+x\n c");
}

#[test]
fn test_unified_diff_without_context() {
    let diff = generate_diff(
        "a\nb\nc",
        "a\nx\nc",
        &DiffOptions {
            context_lines: 0,
            ..Default::default()
        },
    );
    assert_eq!(diff.unified, "@@ -2,1 +2,1 @@\n-b\n+x");
}

#[test]
fn test_diff_identity_property() {
    for content in ["", "one line", "a\nb\nc", "trailing\n"] {
        let diff = generate_diff(content, content, &DiffOptions::default());
        assert_eq!(diff.summary.total_changes, 0, "content: {:?}", content);
        assert_eq!(diff.summary.additions, 0);
        assert_eq!(diff.summary.deletions, 0);
    }
}

#[test]
fn test_diff_cross_symmetry_property() {
    let a = "alpha\nbeta\ngamma\ndelta";
    let b = "alpha\nBETA\ngamma\nepsilon\nzeta";

    let forward = generate_diff(a, b, &DiffOptions::default());
    let backward = generate_diff(b, a, &DiffOptions::default());

    assert_eq!(forward.summary.additions, backward.summary.deletions);
    assert_eq!(forward.summary.deletions, backward.summary.additions);
    assert_eq!(forward.summary.unchanged, backward.summary.unchanged);
}

#[test]
fn test_failed_transaction_leaves_no_partial_state() {
    let storage = Arc::new(MemStorage::new());
    let store = PromptStore::new(Arc::clone(&storage));
    let prompt = store.create_prompt("T", "content", vec![], None).unwrap();

    let result: VaultResult<()> = storage.transaction(&mut |tx| {
        tx.delete_versions_for_prompt(&prompt.id)?;
        tx.delete_prompt(&prompt.id)?;
        Err(promptvault_core::VaultError::transaction("injected failure"))
    });
    assert!(result.is_err());

    // The prompt and its version chain survived intact
    let reloaded = store.get_prompt(&prompt.id).unwrap();
    assert_eq!(reloaded, prompt);
    assert_eq!(storage.count_versions().unwrap(), 1);
}

#[test]
fn test_rollback_guard_rails() {
    let vault = vault();
    let store = vault.store();
    let control = vault.control();

    let a = store.create_prompt("A", "a content", vec![], None).unwrap();
    let b = store.create_prompt("B", "b content", vec![], None).unwrap();

    let err = control
        .rollback_to_version(&a.id, &b.current_version_id, None)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::VersionWrongPrompt);

    let err = control.rollback_to_version(&a.id, "ghost", None).unwrap_err();
    assert_eq!(err.code(), ErrorCode::VersionNotFound);

    let err = control
        .rollback_to_version("ghost", &a.current_version_id, None)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::PromptNotFound);

    // No version was appended by any failed attempt
    assert_eq!(control.version_history(&a.id).unwrap().len(), 1);
}

#[test]
fn test_listing_and_stats() {
    let vault = vault();
    let store = vault.store();

    let first = store.create_prompt("First", "1", vec![], None).unwrap();
    store.create_prompt("Second", "1", vec![], None).unwrap();
    store
        .update_prompt(&first.id, PromptUpdate::default().content("2"))
        .unwrap();

    // Most recently updated first
    let listed = store.list_prompts(10, 0).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].title, "First");

    let stats = store.stats().unwrap();
    assert_eq!(stats.total_prompts, 2);
    assert_eq!(stats.total_versions, 3);
}

#[test]
fn test_concurrent_updates_serialize_per_prompt() {
    let storage = Arc::new(MemStorage::new());
    let store = Arc::new(PromptStore::new(Arc::clone(&storage)));
    let prompt = store.create_prompt("T", "v0", vec![], None).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            let id = prompt.id.clone();
            std::thread::spawn(move || {
                store
                    .update_prompt(&id, PromptUpdate::default().content(format!("update {}", i)))
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // All eight updates landed with distinct, gapless version numbers
    let versions = storage.versions_for_prompt(&prompt.id).unwrap();
    assert_eq!(versions.len(), 9);
    let numbers: Vec<u32> = versions.iter().map(|v| v.version_number).collect();
    assert_eq!(numbers, (1..=9).collect::<Vec<u32>>());

    let reloaded = store.get_prompt(&prompt.id).unwrap();
    assert_eq!(reloaded.version_count, 9);
}

#[test]
fn test_file_backed_vault_persists_history() {
    let dir = tempfile::tempdir().unwrap();
    let config = VaultConfig {
        database_path: Some(dir.path().join("vault.db")),
        ..Default::default()
    };

    let prompt_id = {
        let vault = Vault::open(&config).unwrap();
        let prompt = vault.store().create_prompt("T", "v1", vec![], None).unwrap();
        vault
            .store()
            .update_prompt(&prompt.id, PromptUpdate::default().content("v2"))
            .unwrap();
        prompt.id
    };

    let vault = Vault::open(&config).unwrap();
    let history = vault.control().version_history(&prompt_id).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].content, "v2");
    assert_eq!(vault.store().get_prompt(&prompt_id).unwrap().content, "v2");
}
