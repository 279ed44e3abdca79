//! Bundled demo corpus.
//!
//! A small Viennese honoring archive used by the demo binary, the usage
//! example and the integration tests. The records deliberately cover the
//! awkward shapes real archive data has: partial dates, missing death
//! dates, subjects without events, organizations and locations next to
//! people.

use crate::db::local::LocalRepository;
use crate::models::subject::{
    Event, EventId, GeoPoint, LifeFunction, Subject, SubjectId, SubjectKind, ThemeId,
};

/// Ids of the seeded corpus, for tests that address records directly.
#[derive(Debug, Clone)]
pub struct DemoArchive {
    pub music_theme: ThemeId,
    pub exile_theme: ThemeId,
    pub subjects: Vec<SubjectId>,
}

/// Create a repository pre-loaded with the demo corpus.
pub fn demo_repository() -> (LocalRepository, DemoArchive) {
    let repo = LocalRepository::new();
    let archive = seed_demo_archive(&repo);
    (repo, archive)
}

/// Seed the demo corpus into an existing repository.
pub fn seed_demo_archive(repo: &LocalRepository) -> DemoArchive {
    let music = repo.store_theme_impl("Musik in Wien");
    let exile = repo.store_theme_impl("Exil und Rückkehr");

    let mut subjects = Vec::new();

    let function = |label: &str, start: Option<&str>, end: Option<&str>| LifeFunction {
        label: label.to_string(),
        start: start.map(str::to_string),
        end: end.map(str::to_string),
    };

    // ==================== People ====================

    let zweig = repo.store_subject_impl(
        Subject::new(SubjectId(0), "Stefan Zweig", SubjectKind::Person)
            .with_birth("1881-11-28")
            .with_death("1942-02-22")
            .with_gender("männlich")
            .with_roles(["Schriftsteller"])
            .with_functions([
                function("Schriftsteller", Some("1901"), Some("1942")),
                function("Exil", Some("1934"), Some("1942-02-22")),
            ]),
    );
    subjects.push(zweig);

    let schoenberg = repo.store_subject_impl(
        Subject::new(SubjectId(0), "Arnold Schönberg", SubjectKind::Person)
            .with_birth("1874-09-13")
            .with_death("1951-07-13")
            .with_gender("männlich")
            .with_roles(["Komponist", "Maler"])
            .with_functions([
                function("Komponist", Some("1899"), Some("1951")),
                function("Exil", Some("1933-05"), Some("1951-07-13")),
            ]),
    );
    subjects.push(schoenberg);

    let mahler = repo.store_subject_impl(
        Subject::new(SubjectId(0), "Gustav Mahler", SubjectKind::Person)
            .with_birth("1860-07-07")
            .with_death("1911-05-18")
            .with_gender("männlich")
            .with_roles(["Komponist", "Dirigent"])
            .with_functions([
                function("Hofoperndirektor", Some("1897-10"), Some("1907")),
                function("Komponist", Some("1880"), Some("1911")),
            ]),
    );
    subjects.push(mahler);

    let kadmon = repo.store_subject_impl(
        Subject::new(SubjectId(0), "Stella Kadmon", SubjectKind::Person)
            .with_birth("1902-07-16")
            .with_death("1989-10-12")
            .with_gender("weiblich")
            .with_roles(["Schauspielerin", "Theaterleiterin"])
            .with_functions([
                function("Theaterleiterin", Some("1931"), Some("1938")),
                function("Exil", Some("1938"), Some("1947")),
                function("Theaterleiterin", Some("1947"), Some("1981")),
            ]),
    );
    subjects.push(kadmon);

    let suttner = repo.store_subject_impl(
        Subject::new(SubjectId(0), "Bertha von Suttner", SubjectKind::Person)
            .with_birth("1843-06-09")
            .with_death("1914-06-21")
            .with_gender("weiblich")
            .with_roles(["Schriftstellerin"])
            .with_functions([function("Schriftstellerin", Some("1885"), Some("1914"))]),
    );
    subjects.push(suttner);

    let torberg = repo.store_subject_impl(
        Subject::new(SubjectId(0), "Friedrich Torberg", SubjectKind::Person)
            .with_birth("1908-09-16")
            .with_death("1979-11-10")
            .with_gender("männlich")
            .with_roles(["Schriftsteller", "Publizist"])
            .with_functions([
                function("Schriftsteller", Some("1930"), Some("1979")),
                function("Exil", Some("1938-03"), Some("1951")),
            ]),
    );
    subjects.push(torberg);

    // Birth date only partially known, no death recorded anywhere.
    let ungar = repo.store_subject_impl(
        Subject::new(SubjectId(0), "Hilde Ungar", SubjectKind::Person)
            .with_birth("1910")
            .with_gender("weiblich")
            .with_roles(["Schauspielerin"])
            .with_functions([function("Exil", Some("1939"), None)]),
    );
    subjects.push(ungar);

    // ==================== Organizations and locations ====================

    let philharmoniker = repo.store_subject_impl(
        Subject::new(SubjectId(0), "Wiener Philharmoniker", SubjectKind::Organization)
            .with_birth("1842-03-28")
            .with_roles(["Orchester"]),
    );
    subjects.push(philharmoniker);

    let judenplatz = repo.store_subject_impl(
        Subject::new(SubjectId(0), "Judenplatz", SubjectKind::Location)
            .with_location_types(["Platz"])
            .with_coordinates([GeoPoint {
                lat: 48.2118,
                lon: 16.3696,
                district: Some(1),
            }]),
    );
    subjects.push(judenplatz);

    let karl_marx_hof = repo.store_subject_impl(
        Subject::new(SubjectId(0), "Karl-Marx-Hof", SubjectKind::Location)
            .with_birth("1930-10-12")
            .with_location_types(["Gemeindebau"])
            .with_coordinates([GeoPoint {
                lat: 48.2441,
                lon: 16.3664,
                district: Some(19),
            }]),
    );
    subjects.push(karl_marx_hof);

    // ==================== Events ====================

    let event = |name: &str| Event::new(EventId(0), name);

    repo.store_event_impl(
        event("Zweiggasse benannt")
            .with_start("1949-07-21")
            .with_themes([exile]),
        &[zweig],
    );
    repo.store_event_impl(
        event("Gedenktafel am Geburtshaus enthüllt")
            .with_start("1961-11-28")
            .with_themes([exile]),
        &[zweig],
    );
    repo.store_event_impl(
        event("Ausstellung 'Abschied von Europa'")
            .with_start("2014-05")
            .with_end("2015-01")
            .with_themes([exile]),
        &[zweig],
    );

    repo.store_event_impl(
        event("Schönbergplatz benannt")
            .with_start("1978-06-29")
            .with_themes([music, exile]),
        &[schoenberg],
    );
    repo.store_event_impl(
        event("Arnold-Schönberg-Preis gestiftet")
            .with_start("2001")
            .with_themes([music]),
        &[schoenberg],
    );
    repo.store_event_impl(
        event("Symposium zum 50. Todestag")
            .with_start("2001-07")
            .with_themes([music]),
        &[schoenberg],
    );

    repo.store_event_impl(
        event("Mahlerstraße benannt")
            .with_start("1919")
            .with_themes([music]),
        &[mahler],
    );
    repo.store_event_impl(
        event("Denkmal im Stadtpark aufgestellt")
            .with_start("1957-05")
            .with_themes([music]),
        &[mahler],
    );
    repo.store_event_impl(
        event("Jubiläum: 100. Geburtstag")
            .with_start("1960-07-07")
            .with_themes([music]),
        &[mahler],
    );
    // Honoring event with an unresolvable date, dropped by preparation.
    repo.store_event_impl(
        event("Gedenkkonzert (Datum unbekannt)").with_themes([music]),
        &[mahler],
    );

    repo.store_event_impl(
        event("Gedenktafel am Theater der Courage")
            .with_start("1999-10")
            .with_themes([exile]),
        &[kadmon],
    );
    repo.store_event_impl(
        event("Preis der Stadt Wien verliehen")
            .with_start("1962")
            .with_themes([exile]),
        &[kadmon],
    );

    repo.store_event_impl(
        event("Suttnergasse benannt").with_start("1949"),
        &[suttner],
    );
    repo.store_event_impl(
        event("Denkmal der Friedensbewegung").with_start("1959-06"),
        &[suttner],
    );

    repo.store_event_impl(
        event("Torberggasse benannt")
            .with_start("1983-03")
            .with_themes([exile]),
        &[torberg],
    );

    // Shared event, related to two subjects at once.
    repo.store_event_impl(
        event("Ausstellung 'Musik im Exil'")
            .with_start("1995-10")
            .with_end("1996-02")
            .with_themes([music, exile])
            .with_relation_count(6),
        &[schoenberg, torberg],
    );

    repo.store_event_impl(
        event("Jubiläum: 150 Jahre Philharmoniker")
            .with_start("1992-03-28")
            .with_themes([music]),
        &[philharmoniker],
    );
    repo.store_event_impl(
        event("Konferenz zur Orchestergeschichte")
            .with_start("2017-11")
            .with_themes([music]),
        &[philharmoniker],
    );

    repo.store_event_impl(
        event("Denkmal für die Opfer der Schoah enthüllt")
            .with_start("2000-10-25")
            .with_themes([exile]),
        &[judenplatz],
    );
    repo.store_event_impl(
        event("Ausstellung zum Mittelalterlichen Judenplatz")
            .with_start("2010-09")
            .with_themes([exile]),
        &[judenplatz],
    );

    repo.store_event_impl(
        event("Gedenktafel Februar 1934 angebracht")
            .with_start("1984-02-12")
            .with_themes([exile]),
        &[karl_marx_hof],
    );

    DemoArchive {
        music_theme: music,
        exile_theme: exile,
        subjects,
    }
}

/// Generate a deterministic synthetic archive for stress tests and
/// benchmarks. Subjects get a birth year spread over a century, most get
/// a death, and each receives `events_per_subject` honoring events.
pub fn synthetic_archive(subject_count: usize, events_per_subject: usize) -> LocalRepository {
    let repo = LocalRepository::new();
    let theme = repo.store_theme_impl("Synthetisch");

    const NAMES: [&str; 8] = [
        "Denkmal errichtet",
        "Gasse benannt",
        "Preis verliehen",
        "Symposium abgehalten",
        "Jahrestag begangen",
        "Ausstellung eröffnet",
        "Gedenktafel enthüllt",
        "Würdigung im Rathaus",
    ];

    for i in 0..subject_count {
        let birth_year = 1820 + (i * 7 % 100) as i32;
        let death_year = birth_year + 40 + (i * 13 % 45) as i32;

        let mut subject = Subject::new(
            SubjectId(0),
            format!("Subjekt {i}"),
            SubjectKind::Person,
        )
        .with_birth(format!("{birth_year}-01-15"))
        .with_gender(if i % 3 == 0 { "weiblich" } else { "männlich" })
        .with_roles([if i % 2 == 0 { "Komponist" } else { "Schriftsteller" }]);

        // Every eleventh subject has no recorded death.
        if i % 11 != 0 {
            subject = subject.with_death(format!("{death_year}-06-30"));
        }

        let id = repo.store_subject_impl(subject);

        for j in 0..events_per_subject {
            let event_year = death_year + 2 + (j * 9 % 60) as i32;
            let name = NAMES[(i + j) % NAMES.len()];
            repo.store_event_impl(
                Event::new(EventId(0), name)
                    .with_start(format!("{event_year}-05-01"))
                    .with_themes([theme])
                    .with_relation_count(1 + (i + j) % 5),
                &[id],
            );
        }
    }

    repo
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{EventRepository, SubjectRepository};

    #[tokio::test]
    async fn test_demo_archive_shape() {
        let (repo, archive) = demo_repository();
        assert_eq!(archive.subjects.len(), 10);
        assert_eq!(repo.subject_count(), 10);

        let themes = repo.list_themes().await.unwrap();
        assert_eq!(themes.len(), 2);

        // Suttner has no themed events, so the exile theme excludes her.
        let exiled = repo
            .fetch_subjects_by_theme(Some(archive.exile_theme))
            .await
            .unwrap();
        assert!(exiled.iter().all(|s| s.name != "Bertha von Suttner"));
        assert!(exiled.iter().any(|s| s.name == "Stefan Zweig"));
    }

    #[tokio::test]
    async fn test_demo_events_cover_shared_relations() {
        let (repo, archive) = demo_repository();
        let schoenberg = archive.subjects[1];
        let events = repo.fetch_events_for_subject(schoenberg).await.unwrap();
        assert!(events.iter().any(|e| e.name == "Ausstellung 'Musik im Exil'"));
    }

    #[tokio::test]
    async fn test_synthetic_archive_counts() {
        let repo = synthetic_archive(50, 4);
        assert_eq!(repo.subject_count(), 50);
        assert_eq!(repo.event_count(), 200);
    }
}
