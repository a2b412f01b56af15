use std::cell::RefCell;
use std::fs;
use std::path::Path;

use respack::{
    Bundle, Entry, Event, ExportOptions, NullSink, Property, ResourcePack, SaveOptions,
    TabularExportOptions, TabularImportOptions, TabularOptions,
};
use tempfile::TempDir;

fn write_resource_file(root: &Path, module: &str, file_name: &str, content: &str) {
    let dir = root.join(module).join("templates").join("resources");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file_name), content).unwrap();
}

fn export_options(out_name: &str) -> TabularExportOptions {
    TabularExportOptions {
        export: ExportOptions {
            out_name: out_name.to_string(),
            if_not_locales: Vec::new(),
        },
        format: TabularOptions {
            eol: "\n".to_string(),
            ..TabularOptions::default()
        },
    }
}

fn import_options(base_dir: &Path) -> TabularImportOptions {
    TabularImportOptions {
        format: TabularOptions {
            eol: "\n".to_string(),
            ..TabularOptions::default()
        },
        base_dir: base_dir.to_path_buf(),
    }
}

#[test]
fn build_export_ingest_round_trip() {
    let workspace = TempDir::new().unwrap();
    let root = workspace.path();
    write_resource_file(
        root,
        "app_storefront",
        "checkout.properties",
        "pay=Pay now\ncancel=Cancel\nnote=Includes ; and \"quotes\"\n",
    );
    write_resource_file(
        root,
        "app_storefront",
        "checkout_fr.properties",
        "pay=Payer\n",
    );

    let original = ResourcePack::from_module_dirs(&[root], &NullSink).unwrap();
    let bytes = original
        .to_tabular_package(&export_options("pack"), &NullSink)
        .unwrap();
    let archive_path = root.join("pack.zip");
    fs::write(&archive_path, bytes).unwrap();

    let ingested =
        ResourcePack::from_tabular_package(&archive_path, &import_options(root), &NullSink)
            .unwrap();

    let module = ingested.module("app_storefront").unwrap();
    assert_eq!(module.dir(), Some(root.join("app_storefront").as_path()));

    let original_bundle = original
        .module("app_storefront")
        .unwrap()
        .bundle("checkout")
        .unwrap();
    let bundle = module.bundle("checkout").unwrap();
    assert_eq!(bundle.locales(), original_bundle.locales());
    for entry in original_bundle.entries() {
        let round_tripped = bundle.entry(entry.key()).unwrap();
        for locale in original_bundle.locales() {
            assert_eq!(
                round_tripped.translation_or(locale, ""),
                entry.translation_or(locale, ""),
                "key {} locale {}",
                entry.key(),
                locale
            );
        }
    }
}

#[test]
fn ambiguous_module_is_excluded_and_reported_once() {
    let workspace = TempDir::new().unwrap();
    let root = workspace.path();
    write_resource_file(&root.join("site_a"), "app", "checkout.properties", "k=v\n");
    write_resource_file(&root.join("site_b"), "app", "checkout.properties", "k=v\n");

    // a package with two members for the same ambiguous module
    let mut pack = ResourcePack::new();
    pack.add_properties(
        "app",
        "checkout",
        "default",
        vec![Property {
            key: "k".to_string(),
            value: "v".to_string(),
            span: None,
        }],
    );
    pack.add_properties(
        "app",
        "account",
        "default",
        vec![Property {
            key: "k2".to_string(),
            value: "v2".to_string(),
            span: None,
        }],
    );
    let bytes = pack
        .to_tabular_package(&export_options("pack"), &NullSink)
        .unwrap();
    let archive_path = root.join("pack.zip");
    fs::write(&archive_path, bytes).unwrap();

    let events = RefCell::new(Vec::new());
    let sink = |event: Event| {
        if let Event::AmbiguousModule {
            module, candidates, ..
        } = event
        {
            events.borrow_mut().push((module, candidates));
        }
    };
    let ingested =
        ResourcePack::from_tabular_package(&archive_path, &import_options(root), &sink).unwrap();

    assert!(ingested.modules().is_empty());
    let events = events.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].0, "app");
    assert_eq!(events[0].1.len(), 2);
}

#[test]
fn unknown_module_is_excluded_and_reported() {
    let workspace = TempDir::new().unwrap();
    let root = workspace.path();

    let mut pack = ResourcePack::new();
    pack.add_properties(
        "ghost",
        "checkout",
        "default",
        vec![Property {
            key: "k".to_string(),
            value: "v".to_string(),
            span: None,
        }],
    );
    let bytes = pack
        .to_tabular_package(&export_options("pack"), &NullSink)
        .unwrap();
    let archive_path = root.join("pack.zip");
    fs::write(&archive_path, bytes).unwrap();

    let unknown = RefCell::new(Vec::new());
    let sink = |event: Event| {
        if let Event::UnknownModule { module, .. } = event {
            unknown.borrow_mut().push(module);
        }
    };
    let ingested =
        ResourcePack::from_tabular_package(&archive_path, &import_options(root), &sink).unwrap();

    assert!(ingested.modules().is_empty());
    assert_eq!(*unknown.borrow(), vec!["ghost".to_string()]);
}

#[test]
fn save_after_building_from_source_anchors_modules() {
    let workspace = TempDir::new().unwrap();
    let root = workspace.path();
    write_resource_file(root, "app", "checkout.properties", "pay=Pay now\n");
    write_resource_file(root, "app", "checkout_fr.properties", "pay=Payer\n");

    let pack = ResourcePack::from_module_dirs(&[root], &NullSink).unwrap();
    assert_eq!(
        pack.module("app").unwrap().dir(),
        Some(root.join("app").as_path())
    );

    pack.save(&SaveOptions::default(), &NullSink).unwrap();
    let content = fs::read_to_string(
        root.join("app")
            .join("templates")
            .join("resources")
            .join("checkout.properties"),
    )
    .unwrap();
    assert_eq!(content, "pay=Pay now\n");
}

#[test]
fn merge_with_no_upserts_leaves_file_bytes_untouched() {
    let workspace = TempDir::new().unwrap();
    let root = workspace.path();
    let module_dir = root.join("app");
    // trailing blank lines must survive a merge that changes nothing
    write_resource_file(root, "app", "checkout.properties", "b=existing\n\n\n");

    let mut bundle = Bundle::new("checkout");
    let mut b = Entry::new("b");
    b.queue_translation("default", "");
    bundle.queue_entry(b);

    let mut pack = ResourcePack::new();
    pack.create_module("app", &module_dir).add_bundle(bundle);
    pack.save(&SaveOptions::default(), &NullSink).unwrap();

    let merged = fs::read_to_string(
        module_dir
            .join("templates")
            .join("resources")
            .join("checkout.properties"),
    )
    .unwrap();
    assert_eq!(merged, "b=existing\n\n\n");
}

#[test]
fn merge_upserts_without_deleting_existing_keys() {
    let workspace = TempDir::new().unwrap();
    let root = workspace.path();
    let module_dir = root.join("app");
    write_resource_file(
        root,
        "app",
        "checkout.properties",
        "# checkout labels\na=1\nkeep=untouched\n",
    );

    let mut bundle = Bundle::new("checkout");
    let mut a = Entry::new("a");
    a.queue_translation("default", "2");
    bundle.queue_entry(a);
    let mut fresh = Entry::new("fresh");
    fresh.queue_translation("default", "new value");
    bundle.queue_entry(fresh);

    let mut pack = ResourcePack::new();
    pack.create_module("app", &module_dir).add_bundle(bundle);
    pack.save(&SaveOptions::default(), &NullSink).unwrap();

    let merged = fs::read_to_string(
        module_dir
            .join("templates")
            .join("resources")
            .join("checkout.properties"),
    )
    .unwrap();
    assert!(merged.contains("# checkout labels"));
    assert!(merged.contains("a=2"));
    assert!(merged.contains("keep=untouched"));
    assert!(merged.contains("fresh=new value"));
    assert!(!merged.contains("a=1"));
}

#[test]
fn merge_with_ignore_if_empty_leaves_existing_value_untouched() {
    let workspace = TempDir::new().unwrap();
    let root = workspace.path();
    let module_dir = root.join("app");
    write_resource_file(root, "app", "checkout.properties", "b=existing\n");

    let mut bundle = Bundle::new("checkout");
    let mut b = Entry::new("b");
    b.queue_translation("default", "");
    bundle.queue_entry(b);

    let mut pack = ResourcePack::new();
    pack.create_module("app", &module_dir).add_bundle(bundle);
    pack.save(
        &SaveOptions {
            ignore_if_empty: true,
        },
        &NullSink,
    )
    .unwrap();

    let merged = fs::read_to_string(
        module_dir
            .join("templates")
            .join("resources")
            .join("checkout.properties"),
    )
    .unwrap();
    assert_eq!(merged, "b=existing\n");
}

#[test]
fn merge_without_ignore_if_empty_blanks_the_value() {
    let workspace = TempDir::new().unwrap();
    let root = workspace.path();
    let module_dir = root.join("app");
    write_resource_file(root, "app", "checkout.properties", "b=existing\n");

    let mut bundle = Bundle::new("checkout");
    let mut b = Entry::new("b");
    b.queue_translation("default", "");
    bundle.queue_entry(b);

    let mut pack = ResourcePack::new();
    pack.create_module("app", &module_dir).add_bundle(bundle);
    pack.save(
        &SaveOptions {
            ignore_if_empty: false,
        },
        &NullSink,
    )
    .unwrap();

    let merged = fs::read_to_string(
        module_dir
            .join("templates")
            .join("resources")
            .join("checkout.properties"),
    )
    .unwrap();
    assert_eq!(merged, "b=\n");
}

#[test]
fn merge_creates_locale_suffixed_files() {
    let workspace = TempDir::new().unwrap();
    let root = workspace.path();
    let module_dir = root.join("app");
    fs::create_dir_all(module_dir.join("templates").join("resources")).unwrap();

    let mut bundle = Bundle::new("account");
    let mut entry = Entry::new("hello");
    entry.queue_translation("default", "Hello");
    entry.queue_translation("pt_BR", "Olá");
    bundle.queue_entry(entry);

    let mut pack = ResourcePack::new();
    pack.create_module("app", &module_dir).add_bundle(bundle);
    pack.save(&SaveOptions::default(), &NullSink).unwrap();

    let resources = module_dir.join("templates").join("resources");
    assert_eq!(
        fs::read_to_string(resources.join("account.properties")).unwrap(),
        "hello=Hello\n"
    );
    assert_eq!(
        fs::read_to_string(resources.join("account_pt_BR.properties")).unwrap(),
        "hello=Olá\n"
    );
}

#[test]
fn multiline_source_values_survive_export_and_merge_as_escapes() {
    let workspace = TempDir::new().unwrap();
    let root = workspace.path();
    write_resource_file(
        root,
        "app",
        "legal.properties",
        "terms=First line \\\n    second line\n",
    );

    let pack = ResourcePack::from_module_dirs(&[root], &NullSink).unwrap();
    let bytes = pack
        .to_tabular_package(&export_options("pack"), &NullSink)
        .unwrap();
    let archive_path = root.join("pack.zip");
    fs::write(&archive_path, bytes).unwrap();

    let ingested =
        ResourcePack::from_tabular_package(&archive_path, &import_options(root), &NullSink)
            .unwrap();
    let entry = ingested
        .module("app")
        .unwrap()
        .bundle("legal")
        .unwrap()
        .entry("terms")
        .unwrap();
    // the exporter restored the original line break inside the quoted field
    assert_eq!(
        entry.translation_or("default", ""),
        "First line \nsecond line"
    );

    ingested.save(&SaveOptions::default(), &NullSink).unwrap();
    let merged = fs::read_to_string(
        root.join("app")
            .join("templates")
            .join("resources")
            .join("legal.properties"),
    )
    .unwrap();
    assert!(merged.contains("terms=First line \\nsecond line"));
}

#[test]
fn ingest_reports_invalid_members_and_continues() {
    let workspace = TempDir::new().unwrap();
    let root = workspace.path();
    write_resource_file(root, "app", "checkout.properties", "k=v\n");

    let mut pack = ResourcePack::new();
    pack.add_properties(
        "app",
        "checkout",
        "default",
        vec![Property {
            key: "k".to_string(),
            value: "v".to_string(),
            span: None,
        }],
    );
    let mut bytes = pack
        .to_tabular_package(&export_options("pack"), &NullSink)
        .unwrap();

    // append a member that does not match <name>/<module>/<bundle>.csv
    let mut writer = zip::ZipWriter::new_append(std::io::Cursor::new(std::mem::take(&mut bytes)))
        .unwrap();
    writer
        .start_file("readme.txt", zip::write::SimpleFileOptions::default())
        .unwrap();
    std::io::Write::write_all(&mut writer, b"not a bundle").unwrap();
    let bytes = writer.finish().unwrap().into_inner();

    let archive_path = root.join("pack.zip");
    fs::write(&archive_path, bytes).unwrap();

    let invalid = RefCell::new(Vec::new());
    let sink = |event: Event| {
        if let Event::InvalidMember { member } = event {
            invalid.borrow_mut().push(member);
        }
    };
    let ingested =
        ResourcePack::from_tabular_package(&archive_path, &import_options(root), &sink).unwrap();

    assert_eq!(*invalid.borrow(), vec!["readme.txt".to_string()]);
    assert_eq!(ingested.modules().len(), 1);
    assert_eq!(
        ingested
            .module("app")
            .unwrap()
            .bundle("checkout")
            .unwrap()
            .entry_count(),
        1
    );
}
