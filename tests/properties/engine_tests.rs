use std::collections::BTreeMap;

use binpack::{AllocError, AllocationEngine, BinId, CapacityKey, Color, ObjectId};
use proptest::prelude::*;

use super::linear_choose;

#[derive(Debug, Clone)]
enum EngineOp {
    Add { id: u64, size: u64, color: Color },
    Delete { id: u64 },
    AddBin { id: u64, capacity: u64 },
    RemoveBin { id: u64 },
}

#[derive(Debug, Default)]
struct Model {
    provisioned: BTreeMap<BinId, u64>,
    remaining: BTreeMap<BinId, u64>,
    placed: BTreeMap<ObjectId, (BinId, u64)>,
}

impl Model {
    fn choose(&self, size: u64, color: Color) -> Option<BinId> {
        linear_choose(&self.remaining, size, color)
    }

    fn residents(&self, bin: BinId) -> usize {
        self.placed.values().filter(|(owner, _)| *owner == bin).count()
    }
}

// ========== Strategies ==========

fn arb_color() -> impl Strategy<Value = Color> {
    prop::sample::select(Color::ALL.to_vec())
}

/// Few distinct capacities so that ties are frequent.
fn arb_bins() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(prop_oneof![Just(10u64), Just(20), Just(35), 1u64..60], 1..12)
}

fn arb_engine_op() -> impl Strategy<Value = EngineOp> {
    prop_oneof![
        3 => (0u64..40, 1u64..25, arb_color())
            .prop_map(|(id, size, color)| EngineOp::Add { id, size, color }),
        2 => (0u64..40).prop_map(|id| EngineOp::Delete { id }),
        // ids overlap the ones `setup` provisions, so both outcomes occur
        1 => (1u64..16, prop_oneof![Just(10u64), Just(20), 1u64..60])
            .prop_map(|(id, capacity)| EngineOp::AddBin { id, capacity }),
        1 => (1u64..16).prop_map(|id| EngineOp::RemoveBin { id }),
    ]
}

fn setup(capacities: &[u64]) -> (AllocationEngine, Model) {
    let mut engine = AllocationEngine::new();
    let mut model = Model::default();
    for (idx, &capacity) in capacities.iter().enumerate() {
        let bin = BinId(idx as u64 + 1);
        engine.add_bin(bin, capacity).unwrap();
        model.provisioned.insert(bin, capacity);
        model.remaining.insert(bin, capacity);
    }
    (engine, model)
}

fn check_invariants(engine: &AllocationEngine, model: &Model) -> Result<(), TestCaseError> {
    // both bin indexes agree
    prop_assert!(engine.bins().is_consistent());
    prop_assert_eq!(engine.bin_count(), model.provisioned.len());
    let expected: Vec<CapacityKey> = {
        let mut keys: Vec<_> = model
            .remaining
            .iter()
            .map(|(&bin, &capacity)| CapacityKey { capacity, bin })
            .collect();
        keys.sort();
        keys
    };
    let actual: Vec<CapacityKey> = engine.bins().capacity_order().collect();
    prop_assert_eq!(actual, expected);

    for (&bin, &provisioned) in &model.provisioned {
        let info = engine.bin_info(bin).unwrap();
        prop_assert_eq!(info.capacity, model.remaining[&bin]);

        // capacity conservation
        let resident: u64 = model
            .placed
            .values()
            .filter(|(owner, _)| *owner == bin)
            .map(|(_, size)| size)
            .sum();
        prop_assert_eq!(provisioned - info.capacity, resident);

        let expected: Vec<ObjectId> = model
            .placed
            .iter()
            .filter(|(_, (owner, _))| *owner == bin)
            .map(|(&id, _)| id)
            .collect();
        prop_assert_eq!(info.objects, expected);
    }

    prop_assert_eq!(engine.object_count(), model.placed.len());
    for (&id, &(bin, _)) in &model.placed {
        prop_assert_eq!(engine.locate(id), Ok(bin));
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // For any provisioning and any sequence of placements, deletions and bin
    // additions or removals, the engine picks the same bins as the linear-scan
    // model and all indexes stay in step.
    #[test]
    fn engine_matches_model(
        capacities in arb_bins(),
        ops in prop::collection::vec(arb_engine_op(), 1..150),
    ) {
        let (mut engine, mut model) = setup(&capacities);

        for op in ops {
            match op {
                EngineOp::Add { id, size, color } => {
                    let id = ObjectId(id);
                    let result = engine.add_object(id, size, color);
                    if model.placed.contains_key(&id) {
                        prop_assert_eq!(result, Err(AllocError::DuplicateObjectId(id)));
                    } else if let Some(bin) = model.choose(size, color) {
                        prop_assert_eq!(result, Ok(bin));
                        model.placed.insert(id, (bin, size));
                        *model.remaining.get_mut(&bin).unwrap() -= size;
                    } else {
                        prop_assert_eq!(result, Err(AllocError::NoBinFound { size, color }));
                    }
                }
                EngineOp::Delete { id } => {
                    let id = ObjectId(id);
                    let result = engine.delete_object(id);
                    match model.placed.remove(&id) {
                        Some((bin, size)) => {
                            prop_assert_eq!(result.map(|object| object.size()), Ok(size));
                            *model.remaining.get_mut(&bin).unwrap() += size;
                        }
                        None => {
                            prop_assert_eq!(result, Err(AllocError::ObjectNotFound(id)));
                        }
                    }
                }
                EngineOp::AddBin { id, capacity } => {
                    let bin = BinId(id);
                    let result = engine.add_bin(bin, capacity);
                    if model.provisioned.contains_key(&bin) {
                        prop_assert_eq!(result, Err(AllocError::DuplicateBinId(bin)));
                    } else {
                        prop_assert_eq!(result, Ok(()));
                        model.provisioned.insert(bin, capacity);
                        model.remaining.insert(bin, capacity);
                    }
                }
                EngineOp::RemoveBin { id } => {
                    let bin = BinId(id);
                    let result = engine.remove_bin(bin);
                    if !model.provisioned.contains_key(&bin) {
                        prop_assert_eq!(result, Err(AllocError::BinNotFound(bin)));
                    } else {
                        let objects = model.residents(bin);
                        if objects > 0 {
                            prop_assert_eq!(result, Err(AllocError::BinNotEmpty { bin, objects }));
                        } else {
                            prop_assert_eq!(result, Ok(()));
                            model.provisioned.remove(&bin);
                            model.remaining.remove(&bin);
                        }
                    }
                }
            }

            check_invariants(&engine, &model)?;
        }
    }

    // Adding an object and deleting it again restores the bin it went to.
    #[test]
    fn add_then_delete_round_trips(
        capacities in arb_bins(),
        size in 1u64..40,
        color in arb_color(),
    ) {
        let (mut engine, _) = setup(&capacities);
        let before: Vec<_> = (1..=capacities.len() as u64)
            .map(|id| engine.bin_info(BinId(id)).unwrap())
            .collect();

        match engine.add_object(ObjectId(42), size, color) {
            Ok(bin) => {
                prop_assert_eq!(engine.locate(ObjectId(42)), Ok(bin));
                engine.delete_object(ObjectId(42)).unwrap();
            }
            Err(err) => {
                prop_assert_eq!(err, AllocError::NoBinFound { size, color });
            }
        }

        let after: Vec<_> = (1..=capacities.len() as u64)
            .map(|id| engine.bin_info(BinId(id)).unwrap())
            .collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(
            engine.locate(ObjectId(42)),
            Err(AllocError::ObjectNotFound(ObjectId(42)))
        );
        prop_assert!(engine.bins().is_consistent());
    }
}
