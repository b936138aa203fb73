use std::rc::Rc;

use bson::{Bson, Document, doc};
use trellis_core::{DataSource, DataSourceError, DataSourceFactory, DriverError};
use trellis_driver_memory::MemoryDriver;
use trellis_query::{Clause, Comparison, Query, Sort, SortDirection};

// ── Fixture ─────────────────────────────────────────────────

/// 100 news records: alternating author domains, 5 cycling categories,
/// 4 cycling groups, a cycling creation hour.
fn news_records() -> Vec<Document> {
    (0..100_i32)
        .map(|i| {
            let domain = if i % 2 == 0 { "domain1.com" } else { "domain2.com" };
            doc! {
                "title": format!("title{i}"),
                "author": format!("author{i}@{domain}"),
                "category": { "id": i % 5, "name": format!("category{}", i % 5) },
                "groups": [ { "id": i % 4, "name": format!("group{}", i % 4) } ],
                "create_hour": (i % 4) + 1,
            }
        })
        .collect()
}

fn news_source(driver: Rc<MemoryDriver>) -> DataSource<MemoryDriver> {
    let factory = DataSourceFactory::default();
    let mut ds = factory.create(driver, "news").unwrap();
    ds.add_field("title", "text", Comparison::Like, doc! {})
        .unwrap()
        .add_field("author", "text", Comparison::Like, doc! {})
        .unwrap()
        .add_field(
            "time",
            "time",
            Comparison::Between,
            doc! { "field_mapping": "create_hour" },
        )
        .unwrap()
        .add_field(
            "category",
            "entity",
            Comparison::Eq,
            doc! { "form_options": { "class": "Category" } },
        )
        .unwrap()
        .add_field(
            "group",
            "entity",
            Comparison::MemberOf,
            doc! { "field_mapping": "groups" },
        )
        .unwrap();
    ds
}

fn bind_fields(ds: &mut DataSource<MemoryDriver>, fields: Document) {
    ds.bind_parameters(&doc! { "news": { "fields": fields } });
}

fn first_title(ds: &DataSource<MemoryDriver>) -> String {
    let result = ds.get_result().unwrap();
    let first = result.iter().next().expect("empty result");
    first.get_str("title").unwrap().to_string()
}

// ── Filtering scenarios ─────────────────────────────────────

#[test]
fn unbound_source_returns_the_whole_set() {
    let ds = news_source(Rc::new(MemoryDriver::new(news_records())));
    let result = ds.get_result().unwrap();
    assert_eq!(result.total(), 100);
    assert_eq!(result.len(), 100);
    // Cached until something changes.
    assert!(Rc::ptr_eq(&result, &ds.get_result().unwrap()));
}

#[test]
fn author_like_narrows_to_one_domain() {
    let mut ds = news_source(Rc::new(MemoryDriver::new(news_records())));
    bind_fields(&mut ds, doc! { "author": "domain1.com" });
    let result = ds.get_result().unwrap();
    assert_eq!(result.total(), 50);
    assert!(Rc::ptr_eq(&result, &ds.get_result().unwrap()));
}

#[test]
fn additional_title_filter_narrows_further() {
    let mut ds = news_source(Rc::new(MemoryDriver::new(news_records())));
    bind_fields(
        &mut ds,
        doc! { "author": "domain1.com", "title": "title3" },
    );
    let result = ds.get_result().unwrap();
    // title3, title30..title39 intersected with the even-indexed domain.
    assert_eq!(result.total(), 5);
}

#[test]
fn entity_and_member_of_filters() {
    let mut ds = news_source(Rc::new(MemoryDriver::new(news_records())));

    bind_fields(&mut ds, doc! { "group": 1 });
    assert_eq!(ds.get_result().unwrap().total(), 25);

    bind_fields(&mut ds, doc! { "category": 1 });
    assert_eq!(ds.get_result().unwrap().total(), 20);

    bind_fields(&mut ds, doc! { "group": 1, "category": 1 });
    assert_eq!(ds.get_result().unwrap().total(), 5);
}

#[test]
fn between_on_a_mapped_time_field() {
    let mut ds = news_source(Rc::new(MemoryDriver::new(news_records())));
    bind_fields(&mut ds, doc! { "time": [2, 3] });
    // Hours cycle 1..=4, so two of four cohorts match.
    assert_eq!(ds.get_result().unwrap().total(), 50);
}

#[test]
fn malformed_between_value_is_a_driver_error() {
    let mut ds = news_source(Rc::new(MemoryDriver::new(news_records())));
    bind_fields(&mut ds, doc! { "time": [2] });
    let err = ds.get_result().unwrap_err();
    assert!(matches!(
        err,
        DataSourceError::Driver(DriverError::InvalidClause(_))
    ));
}

#[test]
fn cleared_fields_stop_filtering() {
    let mut ds = news_source(Rc::new(MemoryDriver::new(news_records())));
    bind_fields(&mut ds, doc! { "author": "domain1.com" });
    assert_eq!(ds.get_result().unwrap().total(), 50);

    ds.clear_fields();
    bind_fields(&mut ds, doc! { "author": "domain1.com" });
    assert_eq!(ds.get_result().unwrap().total(), 100);
}

#[test]
fn rebinding_does_not_accumulate_predicates() {
    let mut ds = news_source(Rc::new(MemoryDriver::new(news_records())));
    bind_fields(&mut ds, doc! { "author": "domain1.com" });
    assert_eq!(ds.get_result().unwrap().total(), 50);

    ds.bind_parameters(&doc! { "news": {} });
    assert_eq!(ds.get_result().unwrap().total(), 100);
}

// ── Pagination ──────────────────────────────────────────────

#[test]
fn paging_exposes_a_window_over_the_full_count() {
    let mut ds = news_source(Rc::new(MemoryDriver::new(news_records())));
    ds.set_max_results(Some(20));
    ds.bind_parameters(&doc! { "news": { "page": 1 } });

    let result = ds.get_result().unwrap();
    assert_eq!(result.total(), 100);
    assert_eq!(result.iter().count(), 20);
    assert_eq!(result.records()[0].get_str("title").unwrap(), "title0");
}

#[test]
fn later_pages_shift_the_window() {
    let mut ds = news_source(Rc::new(MemoryDriver::new(news_records())));
    ds.bind_parameters(&doc! { "news": { "page": 3, "max_results": 10 } });

    let result = ds.get_result().unwrap();
    assert_eq!(result.total(), 100);
    assert_eq!(result.len(), 10);
    assert_eq!(result.records()[0].get_str("title").unwrap(), "title20");
}

// ── Ordering ────────────────────────────────────────────────

#[test]
fn single_key_ascending_order() {
    let mut ds = news_source(Rc::new(MemoryDriver::new(news_records())));
    ds.bind_parameters(&doc! { "news": {
        "ordering": { "title": { "direction": "asc", "priority": 1 } },
    }});
    assert_eq!(first_title(&ds), "title0");

    ds.bind_parameters(&doc! { "news": {
        "ordering": { "title": { "direction": "desc", "priority": 1 } },
    }});
    assert_eq!(first_title(&ds), "title99");
}

#[test]
fn lowest_priority_is_the_primary_key() {
    let mut ds = news_source(Rc::new(MemoryDriver::new(news_records())));
    ds.bind_parameters(&doc! { "news": {
        "ordering": {
            "title": { "direction": "desc", "priority": 2 },
            "author": { "direction": "asc", "priority": 1 },
        },
    }});
    // Author ascending wins: author0@domain1.com carries title0.
    assert_eq!(first_title(&ds), "title0");
}

#[test]
fn secondary_key_breaks_ties() {
    let records = vec![
        doc! { "author": "a", "title": "x" },
        doc! { "author": "a", "title": "z" },
        doc! { "author": "b", "title": "y" },
    ];
    let factory = DataSourceFactory::default();
    let mut ds = factory
        .create(Rc::new(MemoryDriver::new(records)), "news")
        .unwrap();
    ds.add_field("title", "text", Comparison::Like, doc! {})
        .unwrap()
        .add_field("author", "text", Comparison::Like, doc! {})
        .unwrap();

    ds.bind_parameters(&doc! { "news": {
        "ordering": {
            "title": { "direction": "desc", "priority": 2 },
            "author": { "direction": "asc", "priority": 1 },
        },
    }});
    let result = ds.get_result().unwrap();
    let titles: Vec<&str> = result
        .iter()
        .map(|d| d.get_str("title").unwrap())
        .collect();
    assert_eq!(titles, ["z", "x", "y"]);
}

#[test]
fn ordering_survives_alongside_filters_and_paging() {
    let mut ds = news_source(Rc::new(MemoryDriver::new(news_records())));
    ds.bind_parameters(&doc! { "news": {
        "fields": { "author": "domain1.com" },
        "ordering": { "title": { "direction": "desc", "priority": 1 } },
        "max_results": 10,
    }});
    let result = ds.get_result().unwrap();
    assert_eq!(result.total(), 50);
    assert_eq!(result.len(), 10);
    // Largest even-indexed title.
    assert_eq!(result.records()[0].get_str("title").unwrap(), "title98");
}

// ── Pre-built base query ────────────────────────────────────

#[test]
fn base_query_plays_the_prefiltered_role() {
    let base = Query {
        clauses: vec![Clause {
            target: "author".into(),
            field_type: "text".into(),
            comparison: Comparison::Like,
            value: Bson::String("domain1.com".into()),
        }],
        sort: vec![Sort {
            field: "title".into(),
            direction: SortDirection::Desc,
        }],
        ..Query::default()
    };
    let driver = Rc::new(MemoryDriver::with_base_query(news_records(), base));
    let mut ds = news_source(Rc::clone(&driver));

    assert_eq!(ds.get_result().unwrap().total(), 50);
    assert_eq!(first_title(&ds), "title98");

    bind_fields(&mut ds, doc! { "title": "title3" });
    assert_eq!(ds.get_result().unwrap().total(), 5);
}

#[test]
fn one_driver_backs_several_datasources() {
    let driver = Rc::new(MemoryDriver::new(news_records()));
    let factory = DataSourceFactory::default();

    let mut news = news_source(Rc::clone(&driver));
    let mut latest = factory.create(Rc::clone(&driver), "latest").unwrap();
    latest
        .add_field("author", "text", Comparison::Like, doc! {})
        .unwrap();

    let blob = doc! {
        "news": { "fields": { "author": "domain1.com" } },
        "latest": { "fields": { "author": "domain2.com" } },
    };
    news.bind_parameters(&blob);
    latest.bind_parameters(&blob);

    assert_eq!(news.get_result().unwrap().total(), 50);
    assert_eq!(latest.get_result().unwrap().total(), 50);
    assert_eq!(
        news.other_parameters(),
        doc! { "latest": { "fields": { "author": "domain2.com" } } }
    );
}

// ── Views over real results ─────────────────────────────────

#[test]
fn view_reflects_the_bound_state() {
    let mut ds = news_source(Rc::new(MemoryDriver::new(news_records())));
    ds.bind_parameters(&doc! { "news": {
        "fields": { "author": "domain1.com" },
        "max_results": 20,
        "ordering": { "title": { "direction": "asc", "priority": 1 } },
    }});
    ds.get_result().unwrap();

    let view = ds.create_view();
    let names: Vec<String> = view.cursor().map(|(name, _)| name).collect();
    assert_eq!(names, ["title", "author", "time", "category", "group"]);

    assert_eq!(
        view.get_field("author").unwrap().value(),
        Bson::String("domain1.com".into())
    );
    assert_eq!(view.get_option("max_results").unwrap(), Bson::Int64(20));
    assert_eq!(
        view.get_field("title")
            .unwrap()
            .get_option("ordering_direction")
            .unwrap(),
        Bson::String("asc".into())
    );
    // Form options promoted onto the entity field's view.
    assert_eq!(
        view.get_field("category").unwrap().get_option("class").unwrap(),
        Bson::String("Category".into())
    );
}
