//! Property tests: random single-threaded operation sequences checked
//! against a simple model of the expected outcome.

use crate::*;
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy)]
enum Op {
    Optimistic { group: usize, student: u64, stale: bool },
    Pessimistic { group: usize, student: u64 },
}

fn op_strategy(groups: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..groups, 0u64..6, any::<bool>()).prop_map(|(group, student, stale)| Op::Optimistic {
            group,
            student,
            stale
        }),
        (0..groups, 0u64..6).prop_map(|(group, student)| Op::Pessimistic { group, student }),
    ]
}

#[derive(Debug, Clone)]
struct Model {
    capacity: u32,
    students: HashSet<u64>,
    version: u64,
}

impl Model {
    /// Expected error code, or None for success
    fn apply(&mut self, student: u64, stale: bool) -> Option<&'static str> {
        if stale {
            return Some("Conflict");
        }
        if self.students.contains(&student) {
            return Some("DuplicateEnrollment");
        }
        if self.students.len() as u32 >= self.capacity {
            return Some("CapacityExceeded");
        }
        self.students.insert(student);
        self.version += 1;
        None
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_outcomes_match_model(
        capacities in prop::collection::vec(1u32..4, 1..4),
        ops in prop::collection::vec(op_strategy(3), 0..40),
    ) {
        let db = create_inmemory_db();
        let ids: Vec<_> = capacities.iter().map(|&c| create_group(&db, c)).collect();
        let mut models: Vec<_> = capacities
            .iter()
            .map(|&capacity| Model { capacity, students: HashSet::new(), version: 1 })
            .collect();

        for op in ops {
            let (idx, student, stale) = match op {
                Op::Optimistic { group, student, stale } => (group % ids.len(), student, stale),
                Op::Pessimistic { group, student } => (group % ids.len(), student, false),
            };
            let before = db.group(ids[idx]).unwrap();

            let result = match op {
                Op::Optimistic { .. } => {
                    let expected = if !stale {
                        before.version
                    } else if before.version.get() > 1 {
                        Version::new(before.version.get() - 1)
                    } else {
                        before.version.next()
                    };
                    db.enroll_optimistic(ids[idx], StudentId::new(student), expected)
                }
                Op::Pessimistic { .. } => db.enroll_pessimistic(ids[idx], StudentId::new(student)),
            };

            let expected = models[idx].apply(student, stale);
            match (&result, expected) {
                (Ok(_), None) => {}
                (Err(e), Some(code)) => prop_assert_eq!(e.code(), code),
                (r, e) => prop_assert!(false, "got {:?}, model expected {:?}", r, e),
            }
            if result.is_err() {
                prop_assert_eq!(db.group(ids[idx]).unwrap(), before);
            }
        }

        for (idx, gid) in ids.iter().enumerate() {
            let group = db.group(*gid).unwrap();
            prop_assert!(group.enrolled_count <= group.capacity);
            prop_assert_eq!(group.version.get(), models[idx].version);
            prop_assert_eq!(group.enrolled_count as usize, models[idx].students.len());
            prop_assert_eq!(db.active_enrollments(*gid), models[idx].students.len());
        }

        // No student holds two active seats in one group
        let mut pairs = HashSet::new();
        for e in db.enrollment_history() {
            prop_assert!(pairs.insert((e.student_id, e.group_id)));
        }
    }
}
