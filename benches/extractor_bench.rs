use criterion::{Criterion, criterion_group, criterion_main};
use slotswap::catalog::Catalog;
use slotswap::models::{FighterCode, ManifestState, ModPackage, PackageEntry};
use slotswap::services::{SlotExtractor, Verifier, VerifyOptions};
use std::hint::black_box;

/// `{}` is replaced by the slot digit
const PATH_TEMPLATES: &[&str] = &[
    "fighter/captain/model/body/c0{}/model.numatb",
    "fighter/captain/motion/body/c0{}/a00wait1.nuanmb",
    "ui/replace/chara/chara_4/chara_4_captain_0{}.bntx",
    "sound/bank/fighter_voice/vc_captain_c0{}.nus3audio",
    "effect/fighter/captain/model/captain_punch_c0{}/fire.nutexb",
    "stage/custom/texture_{}.nutexb",
];

fn sample_paths() -> Vec<String> {
    let mut paths = Vec::new();
    for slot in 0..8 {
        for template in PATH_TEMPLATES {
            paths.push(template.replace("{}", &slot.to_string()));
        }
    }
    paths
}

fn bench_extract(c: &mut Criterion) {
    let catalog = Catalog::builtin();
    let extractor = SlotExtractor::new(&catalog);
    let paths = sample_paths();

    c.bench_function("extract_mixed_paths", |b| {
        b.iter(|| {
            for path in &paths {
                black_box(extractor.extract(black_box(path)));
            }
        })
    });
}

fn bench_verify(c: &mut Criterion) {
    let catalog = Catalog::builtin();
    let verifier = Verifier::new(&catalog, VerifyOptions::default());
    let entries = (0..500)
        .map(|i| format!("fighter/captain/model/body/c00/tex_{i}.nutexb"))
        .map(PackageEntry::file)
        .collect();
    let package = ModPackage::new(
        "falcon_c00",
        entries,
        ManifestState::Absent,
        vec![FighterCode::new("captain")],
    );

    c.bench_function("verify_500_files", |b| {
        b.iter(|| black_box(verifier.verify(black_box(&package))))
    });
}

criterion_group!(benches, bench_extract, bench_verify);
criterion_main!(benches);
