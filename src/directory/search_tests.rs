use super::*;
use crate::directory::test_support::google_profile;

fn profile(name: &str, interests: &[&str], city: &str) -> MentorProfile {
    let mut p = google_profile(&format!("{}@example.org", name.to_lowercase().replace(' ', ".")), name);
    p.full_name = name.to_string();
    p.research_interests = interests.iter().map(|s| s.to_string()).collect();
    p.city = city.to_string();
    p
}

#[test]
fn keyword_matches_any_text_field_case_insensitively() {
    let p = profile("Farhana Akter", &["Epidemiology"], "Sylhet");
    let f = |kw: &str| SearchFilters { keyword: Some(kw.into()), ..Default::default() };
    assert!(matches(&p, &f("farhana")));
    assert!(matches(&p, &f("EPIDEM")));
    assert!(matches(&p, &f("dhaka")), "institution is searched");
    assert!(matches(&p, &f("phd")), "degrees are searched");
    assert!(!matches(&p, &f("astrophysics")));
    assert!(matches(&p, &f("   ")), "blank keyword is no filter");
}

#[test]
fn every_requested_tag_must_match() {
    let p = profile("Rafiq Islam", &["Machine Learning", "Robotics"], "Dhaka");
    let tags = |t: &[&str]| SearchFilters { research_interests: t.iter().map(|s| s.to_string()).collect(), ..Default::default() };
    assert!(matches(&p, &tags(&["machine learning"])));
    assert!(matches(&p, &tags(&["Robotics", "Machine Learning"])));
    assert!(!matches(&p, &tags(&["Robotics", "Genomics"])));
    assert!(!matches(&p, &tags(&["Machine"])), "tags match whole interests, not substrings");
}

#[test]
fn place_filters_are_exact() {
    let p = profile("Rafiq Islam", &["Robotics"], "Khulna");
    assert!(matches(&p, &SearchFilters { city: Some("khulna".into()), country: Some("Bangladesh".into()), ..Default::default() }));
    assert!(!matches(&p, &SearchFilters { city: Some("Khul".into()), ..Default::default() }));
    assert!(!matches(&p, &SearchFilters { continent: Some("Europe".into()), ..Default::default() }));
}

#[test]
fn pagination_reports_total_before_paging() {
    let rows: Vec<u32> = (1..=25).collect();
    let page = paginate(rows.clone(), PageRequest::new(3, 10));
    assert_eq!(page.total, 25);
    assert_eq!(page.items, vec![21, 22, 23, 24, 25]);

    let past_end = paginate(rows.clone(), PageRequest::new(9, 10));
    assert!(past_end.items.is_empty());
    assert_eq!(past_end.total, 25);

    let clamped = PageRequest::new(0, 1000);
    assert_eq!(clamped.page, 1);
    assert_eq!(clamped.page_size, MAX_PAGE_SIZE);
}

#[test]
fn tag_suggestions_are_lowercase_unique_and_sorted() {
    let lists = vec![
        vec!["Machine Learning".to_string(), "Materials".to_string()],
        vec!["machine learning".to_string(), "Marine Biology".to_string(), "Optics".to_string()],
    ];
    assert_eq!(suggest_tags(&lists, "ma", 10), vec!["machine learning", "marine biology", "materials"]);
    assert_eq!(suggest_tags(&lists, "MA", 2), vec!["machine learning", "marine biology"]);
    assert!(suggest_tags(&lists, "zz", 10).is_empty());
}
