// Library-location suite. These tests touch the real filesystem and
// process environment; each test uses its own uniquely named environment
// variable and scratch directory so parallel test threads cannot
// interfere with one another.

use rc_handle::libpath::{
    augment_path_env, build_new_path_env, find_first_full_path, find_full_paths,
    find_full_paths_env_var, find_in_prefix, library_short_filename, LibPathError, Platform,
};
use std::env;
use std::fs;
use std::path::PathBuf;

fn scratch_dir(label: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("rc_handle_test_{}_{}", std::process::id(), label));
    // Start fresh so reruns see the same filesystem state.
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

fn touch(dir: &PathBuf, name: &str) -> PathBuf {
    let p = dir.join(name);
    fs::write(&p, b"").expect("create file");
    p
}

#[test]
fn short_filename_conventions() {
    assert_eq!(
        library_short_filename("test_native_library", Platform::Linux).unwrap(),
        "libtest_native_library.so"
    );
    assert_eq!(
        library_short_filename("test_native_library", Platform::Windows).unwrap(),
        "test_native_library.dll"
    );
    assert_eq!(
        library_short_filename("test_native_library", Platform::MacOs).unwrap(),
        "libtest_native_library.dylib"
    );
}

#[test]
fn full_paths_filter_to_existing_files() {
    let dir = scratch_dir("full_paths");
    let lib = touch(&dir, "libfoo.so");
    let missing = PathBuf::from("/no/such/directory");

    let hits = find_full_paths("libfoo.so", &[missing.clone(), dir.clone()]);
    assert_eq!(hits, vec![lib]);

    assert!(find_full_paths("libbar.so", &[missing, dir]).is_empty());
}

#[test]
fn env_var_search_finds_libraries() {
    let dir = scratch_dir("env_search");
    let lib = touch(&dir, "libenvsearch.so");

    let var = "RC_HANDLE_TEST_ENV_SEARCH";
    env::set_var(var, &dir);
    assert_eq!(find_full_paths_env_var("libenvsearch.so", var), vec![lib]);
    assert!(find_full_paths_env_var("libother.so", var).is_empty());

    // Unset variable searches nothing.
    assert!(find_full_paths_env_var("libenvsearch.so", "RC_HANDLE_TEST_UNSET").is_empty());
}

#[test]
fn first_full_path_resolution() {
    let dir = scratch_dir("first_path");
    let lib = touch(&dir, "libfirst.so");

    // Absolute inputs are checked directly.
    let abs = lib.to_string_lossy().into_owned();
    assert_eq!(
        find_first_full_path(&abs, None, Platform::Linux).unwrap(),
        lib
    );

    let var = "RC_HANDLE_TEST_FIRST_PATH";
    env::set_var(var, &dir);
    assert_eq!(
        find_first_full_path("libfirst.so", Some(var), Platform::Linux).unwrap(),
        lib
    );

    let err = find_first_full_path("libabsent.so", Some(var), Platform::Linux).unwrap_err();
    assert!(matches!(err, LibPathError::NotFound { .. }));

    assert!(matches!(
        find_first_full_path("", Some(var), Platform::Linux),
        Err(LibPathError::EmptyLibraryName)
    ));
}

#[test]
fn prefix_search_visits_lib_dirs_in_order() {
    let prefix = scratch_dir("prefix_search");
    let lib_dir = prefix.join("lib");
    let lib64_dir = prefix.join("lib64");
    fs::create_dir_all(&lib_dir).unwrap();
    fs::create_dir_all(&lib64_dir).unwrap();
    touch(&lib64_dir, "libprefixed.so");

    // Only lib64 holds the file.
    assert_eq!(
        find_in_prefix(&prefix, "prefixed", Platform::Linux),
        Some(lib64_dir.join("libprefixed.so"))
    );

    // With both present, name order prefers "lib" over "lib64".
    touch(&lib_dir, "libprefixed.so");
    assert_eq!(
        find_in_prefix(&prefix, "prefixed", Platform::Linux),
        Some(lib_dir.join("libprefixed.so"))
    );

    assert_eq!(find_in_prefix(&prefix, "absent", Platform::Linux), None);
}

#[test]
fn augment_appends_or_prepends_existing_dirs_only() {
    let existing = scratch_dir("augment_existing");
    let missing = PathBuf::from("/no/such/augment/dir");
    let prior = scratch_dir("augment_prior");

    let var = "RC_HANDLE_TEST_AUGMENT";
    env::set_var(var, &prior);

    let appended = augment_path_env(&[existing.clone(), missing.clone()], None, var, false)
        .expect("join paths");
    let parts: Vec<PathBuf> = env::split_paths(&appended).collect();
    assert_eq!(parts, vec![prior.clone(), existing.clone()]);

    let prepended =
        augment_path_env(&[existing.clone(), missing], None, var, true).expect("join paths");
    let parts: Vec<PathBuf> = env::split_paths(&prepended).collect();
    assert_eq!(parts, vec![existing.clone(), prior]);

    // A subfolder that exists under the added path is joined in.
    let sub = existing.join("sub64");
    fs::create_dir_all(&sub).unwrap();
    let with_sub =
        augment_path_env(&[existing], Some("sub64"), "RC_HANDLE_TEST_AUGMENT_EMPTY", false)
            .expect("join paths");
    let parts: Vec<PathBuf> = env::split_paths(&with_sub).collect();
    assert_eq!(parts, vec![sub]);
}

#[test]
fn build_new_path_env_proposes_update() {
    let from_var = "RC_HANDLE_TEST_BUILD_FROM";
    let to_var = "RC_HANDLE_TEST_BUILD_TO";
    let prior = scratch_dir("build_prior");
    let added = scratch_dir("build_added");
    env::set_var(to_var, &prior);

    // Source variable unset: the prior value comes back unchanged.
    let unchanged = build_new_path_env("RC_HANDLE_TEST_BUILD_UNSET", to_var, Platform::Linux)
        .expect("join paths");
    assert_eq!(unchanged, prior.clone().into_os_string());

    env::set_var(from_var, &added);
    let proposed = build_new_path_env(from_var, to_var, Platform::Linux).expect("join paths");
    let parts: Vec<PathBuf> = env::split_paths(&proposed).collect();
    assert_eq!(parts, vec![prior, added]);
}
