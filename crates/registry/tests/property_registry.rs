use aggregator_registry::{AggregatorRegistry, RegistryError, RegistryEvent};
use aggregator_types::Principal;
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Op {
    Register {
        caller: u8,
        domain: u8,
        did: String,
        cid: String,
    },
    Update {
        caller: u8,
        domain: u8,
        did: String,
        cid: String,
    },
}

fn domain_name(index: u8) -> String {
    format!("agg{index}.xyz")
}

fn principal(index: u8) -> Principal {
    Principal::new([index; 20])
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let descriptor = ("did:web:[a-z]{1,8}", "Qm[A-Za-z0-9]{4,12}");
    prop_oneof![
        (0u8..6, 0u8..6, descriptor.clone()).prop_map(|(caller, domain, (did, cid))| {
            Op::Register {
                caller,
                domain,
                did,
                cid,
            }
        }),
        (0u8..6, 0u8..6, descriptor).prop_map(|(caller, domain, (did, cid))| Op::Update {
            caller,
            domain,
            did,
            cid,
        }),
    ]
}

proptest! {
    #[test]
    fn registry_matches_reference_model(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let registry = AggregatorRegistry::new();
        // domain -> (did, cid, owner)
        let mut model: HashMap<String, (String, String, u8)> = HashMap::new();
        let mut expected_events = 0usize;

        for op in ops {
            match op {
                Op::Register { caller, domain, did, cid } => {
                    let name = domain_name(domain);
                    let result = registry.register(&principal(caller), &name, &did, &cid);
                    let owner_taken = model.values().any(|(_, _, o)| *o == caller);
                    if model.contains_key(&name) {
                        let is_domain_err =
                            matches!(result, Err(RegistryError::DomainAlreadyRegistered { .. }));
                        prop_assert!(is_domain_err);
                    } else if owner_taken {
                        let is_owner_err =
                            matches!(result, Err(RegistryError::OwnerAlreadyRegistered { .. }));
                        prop_assert!(is_owner_err);
                    } else {
                        prop_assert!(result.is_ok());
                        model.insert(name, (did, cid, caller));
                        expected_events += 1;
                    }
                }
                Op::Update { caller, domain, did, cid } => {
                    let name = domain_name(domain);
                    let result = registry.update(&principal(caller), &name, &did, &cid);
                    match model.get_mut(&name) {
                        None => {
                            let is_missing =
                                matches!(result, Err(RegistryError::DomainNotFound { .. }));
                            prop_assert!(is_missing);
                        }
                        Some(entry) if entry.2 != caller => {
                            let is_not_owner =
                                matches!(result, Err(RegistryError::NotOwner { .. }));
                            prop_assert!(is_not_owner);
                        }
                        Some(entry) => {
                            prop_assert!(result.is_ok());
                            entry.0 = did;
                            entry.1 = cid;
                            expected_events += 1;
                        }
                    }
                }
            }

            // Both lookups agree with the model and with each other after every step.
            for index in 0u8..6 {
                let name = domain_name(index);
                match model.get(&name) {
                    Some((did, cid, owner)) => {
                        let by_domain = registry.get_by_domain(&name).unwrap();
                        prop_assert_eq!(&by_domain.decentralized_id, did);
                        prop_assert_eq!(&by_domain.content_pointer, cid);
                        prop_assert_eq!(by_domain.owner, principal(*owner));

                        let by_owner = registry.get_by_owner(&principal(*owner)).unwrap();
                        prop_assert_eq!(by_owner.domain.as_str(), name.as_str());
                        prop_assert_eq!(&by_owner.decentralized_id, did);
                        prop_assert_eq!(&by_owner.content_pointer, cid);
                        prop_assert!(registry.is_owner_of_domain(&principal(*owner), &name));
                    }
                    None => {
                        prop_assert!(!registry.is_domain_registered(&name));
                        let is_missing = matches!(
                            registry.get_by_domain(&name),
                            Err(RegistryError::DomainNotFound { .. })
                        );
                        prop_assert!(is_missing);
                    }
                }

                let owns_any = model.values().any(|(_, _, o)| *o == index);
                if !owns_any {
                    let is_missing = matches!(
                        registry.get_by_owner(&principal(index)),
                        Err(RegistryError::OwnerNotFound { .. })
                    );
                    prop_assert!(is_missing);
                }
            }
        }

        prop_assert_eq!(registry.len().unwrap(), model.len());
        prop_assert_eq!(registry.events().len(), expected_events);
    }

    #[test]
    fn non_owner_update_never_changes_state(
        owner in 0u8..=255,
        intruder in 0u8..=255,
        did in "did:web:[a-z]{1,12}",
    ) {
        prop_assume!(owner != intruder);
        let registry = AggregatorRegistry::new();
        registry
            .register(&principal(owner), "duffel.xyz", "did:web:duffel.xyz", "QmHash001")
            .unwrap();

        let result = registry.update(&principal(intruder), "duffel.xyz", &did, "QmOther");
        let is_not_owner = matches!(result, Err(RegistryError::NotOwner { .. }));
        prop_assert!(is_not_owner);

        let stored = registry.get_by_domain("duffel.xyz").unwrap();
        prop_assert_eq!(stored.decentralized_id.as_str(), "did:web:duffel.xyz");
        prop_assert_eq!(stored.content_pointer.as_str(), "QmHash001");
        prop_assert!(!registry.is_owner_of_domain(&principal(intruder), "duffel.xyz"));

        let events = registry.events();
        prop_assert_eq!(events.len(), 1);
        let only_registered = matches!(events[0].event, RegistryEvent::Registered { .. });
        prop_assert!(only_registered);
    }
}
