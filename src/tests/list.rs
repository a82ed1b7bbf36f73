use crate::key::TypeKey;
use crate::node::{HashEntry, PersistentList};

struct Svc;

fn entry(name: &str, value: i32) -> HashEntry<i32> {
    HashEntry {
        hash: 0xABCD,
        key: TypeKey::named::<Svc>(name),
        value,
    }
}

#[test]
fn empty_list() {
    let list: PersistentList<i32> = PersistentList::new();
    assert!(list.is_empty());
    assert_eq!(list.len(), 0);
    assert_eq!(list.find(&TypeKey::of::<Svc>()), None);
}

#[test]
fn push_and_find() {
    let list = PersistentList::new().push(entry("a", 1)).push(entry("b", 2));
    assert_eq!(list.len(), 2);
    assert_eq!(list.find(&TypeKey::named::<Svc>("a")), Some(&1));
    assert_eq!(list.find(&TypeKey::named::<Svc>("b")), Some(&2));
    assert_eq!(list.find(&TypeKey::named::<Svc>("c")), None);
}

#[test]
fn push_shares_tail() {
    let one = PersistentList::new().push(entry("a", 1));
    let two = one.push(entry("b", 2));
    // The shorter list is unaffected by the longer one.
    assert_eq!(one.len(), 1);
    assert_eq!(one.find(&TypeKey::named::<Svc>("b")), None);
    assert_eq!(two.len(), 2);
}

#[test]
fn replace_swaps_single_value() {
    let list = PersistentList::new()
        .push(entry("a", 1))
        .push(entry("b", 2))
        .push(entry("c", 3));
    let replaced = list.replace(entry("b", 20)).expect("key present");
    assert_eq!(replaced.len(), 3);
    assert_eq!(replaced.find(&TypeKey::named::<Svc>("a")), Some(&1));
    assert_eq!(replaced.find(&TypeKey::named::<Svc>("b")), Some(&20));
    assert_eq!(replaced.find(&TypeKey::named::<Svc>("c")), Some(&3));
}

#[test]
fn replace_leaves_original_untouched() {
    let list = PersistentList::new().push(entry("a", 1)).push(entry("b", 2));
    let _replaced = list.replace(entry("a", 10)).expect("key present");
    assert_eq!(list.find(&TypeKey::named::<Svc>("a")), Some(&1));
}

#[test]
fn replace_missing_returns_entry() {
    let list = PersistentList::new().push(entry("a", 1));
    let err = list.replace(entry("z", 9)).unwrap_err();
    assert_eq!(err.key, TypeKey::named::<Svc>("z"));
    assert_eq!(err.value, 9);
}

#[test]
fn iter_yields_all_entries() {
    let list = PersistentList::new().push(entry("a", 1)).push(entry("b", 2));
    let values: Vec<i32> = list.iter().map(|e| e.value).collect();
    assert_eq!(values.len(), 2);
    assert!(values.contains(&1));
    assert!(values.contains(&2));
}
