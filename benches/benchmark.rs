use criterion::{criterion_group, criterion_main, Criterion};
use goobits_mirror::core::find_working_copies;
use goobits_mirror::git::parse_remote_branches;
use goobits_mirror::provider::slugify;
use std::fs;
use std::hint::black_box;
use tempfile::TempDir;

fn branch_listing(count: usize) -> String {
    let mut listing = String::from("* main\n  remotes/origin/HEAD -> origin/main\n");
    for i in 0..count {
        listing.push_str(&format!("  feature/local-{i}\n  remotes/origin/feature/topic-{i}\n"));
    }
    listing
}

fn setup_mirror_tree(projects: usize, repos_per_project: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for p in 0..projects {
        let project = temp_dir.path().join(format!("PROJ{p}"));
        fs::create_dir_all(project.join(".markers")).unwrap();
        for r in 0..repos_per_project {
            fs::create_dir_all(project.join(format!("repo-{r}")).join(".git")).unwrap();
        }
    }
    temp_dir
}

fn bench_branch_parsing(c: &mut Criterion) {
    let listing = branch_listing(500);
    c.bench_function("parse_remote_branches_500", |b| {
        b.iter(|| parse_remote_branches(black_box(&listing), "origin"))
    });
}

fn bench_slugify(c: &mut Criterion) {
    let names: Vec<String> = (0..1000).map(|i| format!("Team Service Number {i}")).collect();
    c.bench_function("slugify_1000_names", |b| {
        b.iter(|| names.iter().map(|name| slugify(black_box(name))).count())
    });
}

fn bench_discovery(c: &mut Criterion) {
    let temp_dir = setup_mirror_tree(10, 20);
    let path = temp_dir.path().to_path_buf();

    c.bench_function("discover_200_working_copies", |b| {
        b.iter(|| find_working_copies(&path))
    });
}

criterion_group!(benches, bench_branch_parsing, bench_slugify, bench_discovery);
criterion_main!(benches);
