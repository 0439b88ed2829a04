use collectra_core::{
    AnnotationSession, SelectionEvent, SelectionState, SessionConfig, SurfaceChange, SurfaceEvent,
};
use collectra_geometry::{to_editing_surface, Geometry, SurfaceAnnotation};
use collectra_lineage::LineageIndex;
use collectra_record::{parse_record, render_record, NodeId};
use collectra_test_utils::{cascade_record, SAMPLE_YAML};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone)]
enum Step {
    Create { parent: usize, geometry: Geometry },
    Delete(usize),
    SelectRegion(usize),
}

fn step() -> impl Strategy<Value = Step> {
    let geometry = (0.2..0.8f64, 0.2..0.8f64, 0.05..0.3f64, 0.05..0.3f64)
        .prop_map(|(x, y, w, h)| Geometry::new(x, y, w, h));
    prop_oneof![
        (0..16usize, geometry).prop_map(|(parent, geometry)| Step::Create { parent, geometry }),
        (0..16usize).prop_map(Step::Delete),
        (0..16usize).prop_map(Step::SelectRegion),
    ]
}

fn pick(session: &AnnotationSession, n: usize) -> Option<NodeId> {
    let ids: Vec<_> = session.index().node_ids().cloned().collect();
    if ids.is_empty() {
        None
    } else {
        Some(ids[n % ids.len()].clone())
    }
}

proptest! {
    #[test]
    fn prop_index_tracks_record_through_edits(steps in proptest::collection::vec(step(), 1..20)) {
        let mut session = AnnotationSession::new(cascade_record(), SessionConfig::default());

        for step in steps {
            match step {
                Step::Create { parent, geometry } => {
                    let parent = pick(&session, parent);
                    // text parents are rejected, crops and the root are accepted
                    let parent = parent.as_ref().map(NodeId::as_str);
                    let _ = session.create_region(parent, None, geometry);
                }
                Step::Delete(n) => {
                    if let Some(id) = pick(&session, n) {
                        session.delete(id.as_str()).unwrap();
                    }
                }
                Step::SelectRegion(n) => {
                    if let Some(id) = pick(&session, n) {
                        let _ = session.select_region(id.as_str());
                    }
                }
            }

            let rebuilt = LineageIndex::build(session.record());
            prop_assert_eq!(session.index().node_count(), rebuilt.node_count());
            prop_assert_eq!(session.index().edge_count(), rebuilt.edge_count());
            if let Some(selected) = session.selection().node_id() {
                prop_assert!(session.record().contains(selected.as_str()));
            }
            prop_assert_eq!(session.rows().len(), session.record().len());
        }
    }

    #[test]
    fn prop_surface_round_trip(
        x in 0.1..0.9f64,
        y in 0.1..0.9f64,
        w in 0.01..0.2f64,
        h in 0.01..0.2f64,
    ) {
        prop_assume!(x - w / 2.0 >= 0.0 && x + w / 2.0 <= 1.0);
        prop_assume!(y - h / 2.0 >= 0.0 && y + h / 2.0 <= 1.0);
        let geometry = Geometry::new(x, y, w, h);

        let record = parse_record(SAMPLE_YAML).unwrap();
        let mut session = AnnotationSession::new(record, SessionConfig::default());
        let region = to_editing_surface(&geometry).unwrap();
        let annotation = SurfaceAnnotation::from_region("drawn", "test_image.jpg", &region);
        session.apply_surface_event(&SurfaceEvent::Created { annotation, parent: None }).unwrap();

        let stored = session.record().find("drawn").unwrap().1.geometry.unwrap();
        prop_assert!(stored.approx_eq(&geometry, 1e-9));
    }
}

#[test]
fn edit_session_persists_as_record_text() {
    let record = parse_record(SAMPLE_YAML).unwrap();
    let mut session = AnnotationSession::new(record, SessionConfig::default());
    session
        .create_region(Some("crop_001"), Some("word_001"), Geometry::new(0.5, 0.5, 0.1, 0.05))
        .unwrap();
    session.update_text("text_001", "Hello there").unwrap();

    let text = render_record(session.record()).unwrap();
    let reparsed = parse_record(&text).unwrap();
    assert_eq!(&reparsed, session.record());
    assert!(text.contains("sub_cropped_image:"));
    assert!(text.contains("parents: crop_001"));
}

#[test]
fn listeners_see_highlights_and_stale_clear() {
    let mut session = AnnotationSession::new(cascade_record(), SessionConfig::default());
    let seen: Rc<RefCell<Vec<SelectionEvent>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let handle = session.subscribe(move |e: &SelectionEvent| sink.borrow_mut().push(e.clone()));

    session.select_region("sub_cropped_image-2").unwrap();
    let change = session
        .apply_surface_event(&SurfaceEvent::Deleted {
            annotation: SurfaceAnnotation::from_region(
                "cropped_image_inside_root_image-1",
                "scan.jpg",
                &to_editing_surface(&Geometry::new(0.5, 0.3, 0.8, 0.4)).unwrap(),
            ),
        })
        .unwrap();
    assert!(matches!(change, SurfaceChange::Deleted(ref removed) if removed.len() == 7));
    assert!(session.unsubscribe(handle));

    let seen = seen.borrow();
    assert_eq!(seen.len(), 2);
    assert_eq!(
        seen[0].highlighted,
        [NodeId::from("text_draft-2"), NodeId::from("text_2")]
    );
    assert_eq!(seen[1].state, SelectionState::None);
}
