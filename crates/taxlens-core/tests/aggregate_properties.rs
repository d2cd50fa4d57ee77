use proptest::prelude::*;
use taxlens_core::{
    EntryKind, FormType, IncomeField, IncomeReview, LawEntry, ParsedDocument, aggregate,
    group_and_sort,
};

fn dollars() -> impl Strategy<Value = f64> {
    (0u32..2_000_000).prop_map(f64::from)
}

fn document() -> impl Strategy<Value = ParsedDocument> {
    prop_oneof![
        (dollars(), dollars()).prop_map(|(wages, withheld)| {
            ParsedDocument::new(FormType::W2, "w2.pdf")
                .with("wages", wages)
                .with("federal_tax_withheld", withheld)
        }),
        dollars().prop_map(|interest| {
            ParsedDocument::new(FormType::Int1099, "1099-int.pdf")
                .with("interest_income", interest)
        }),
        (dollars(), dollars()).prop_map(|(ordinary, dist)| {
            ParsedDocument::new(FormType::Div1099, "1099-div.pdf")
                .with("total_ordinary_dividends", ordinary)
                .with("total_capital_gain_dist", dist)
        }),
        dollars().prop_map(|comp| {
            ParsedDocument::new(FormType::Nec1099, "1099-nec.pdf")
                .with("nonemployee_compensation", comp)
        }),
    ]
}

fn entry() -> impl Strategy<Value = LawEntry> {
    (
        prop_oneof![
            Just("Federal Deductions"),
            Just("Federal Income Tax"),
            Just("California Taxes"),
        ],
        -5000i32..5000,
    )
        .prop_map(|(section, amount)| LawEntry {
            name: format!("entry {amount}"),
            citation: String::new(),
            description: String::new(),
            amount: f64::from(amount),
            kind: if amount < 0 {
                EntryKind::Deduction
            } else {
                EntryKind::Tax
            },
            section: section.to_string(),
        })
}

fn manual_sum(docs: &[ParsedDocument], field: IncomeField) -> f64 {
    let mut total = 0.0;
    for doc in docs {
        total += taxlens_core::income::resolve(field, doc);
    }
    total
}

proptest! {
    #[test]
    fn fields_are_sums_of_documents(docs in prop::collection::vec(document(), 0..8)) {
        let record = aggregate(&docs, 2024);
        for field in IncomeField::ALL {
            prop_assert_eq!(record.get(field), manual_sum(&docs, field));
        }
        prop_assert_eq!(record.itemized_deductions, 0.0);
        prop_assert_eq!(record.foreign_income, 0.0);
    }

    #[test]
    fn aggregation_is_idempotent(
        docs in prop::collection::vec(document(), 0..8),
        year in 2020i32..2030,
    ) {
        let first = aggregate(&docs, year);
        let second = aggregate(&docs, year);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.tax_year, year);
    }

    #[test]
    fn removal_never_increases_totals(
        docs in prop::collection::vec(document(), 2..8),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut review = IncomeReview::new();
        for doc in &docs {
            review.add_document(doc.clone());
        }
        let before = review.record().clone();
        let index = pick.index(docs.len());
        review.remove_document(index).unwrap();

        let mut remaining = docs.clone();
        remaining.remove(index);
        let expected = aggregate(&remaining, before.tax_year);
        for field in IncomeField::ALL {
            prop_assert!(review.record().get(field) <= before.get(field));
            prop_assert_eq!(review.record().get(field), expected.get(field));
        }
    }

    #[test]
    fn sections_sorted_by_magnitude(entries in prop::collection::vec(entry(), 0..20)) {
        let total = entries.len();
        let sections = group_and_sort(entries.clone());

        prop_assert_eq!(sections.iter().map(|s| s.entries.len()).sum::<usize>(), total);
        for section in &sections {
            prop_assert!(!section.entries.is_empty());
            for pair in section.entries.windows(2) {
                prop_assert!(pair[0].amount.abs() >= pair[1].amount.abs());
            }
            prop_assert!(section.entries.iter().all(|e| e.section == section.title));
        }

        let mut first_seen: Vec<&str> = Vec::new();
        for e in &entries {
            if !first_seen.contains(&e.section.as_str()) {
                first_seen.push(&e.section);
            }
        }
        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        prop_assert_eq!(titles, first_seen);
    }

    #[test]
    fn equal_magnitudes_keep_input_order(amounts in prop::collection::vec(-3i32..=3, 1..12)) {
        let entries: Vec<LawEntry> = amounts
            .iter()
            .enumerate()
            .map(|(i, &a)| LawEntry {
                name: i.to_string(),
                citation: String::new(),
                description: String::new(),
                amount: f64::from(a),
                kind: EntryKind::Tax,
                section: "S".to_string(),
            })
            .collect();
        let sections = group_and_sort(entries);
        for pair in sections[0].entries.windows(2) {
            if pair[0].amount.abs() == pair[1].amount.abs() {
                let a: usize = pair[0].name.parse().unwrap();
                let b: usize = pair[1].name.parse().unwrap();
                prop_assert!(a < b);
            }
        }
    }
}
