//! Link-time registration and the lazily installed global registry.

#![cfg(feature = "auto_register")]

use core::cell::RefCell;
use std::rc::Rc;

use ogre_serial::{
    Persist, Polymorphic, Ptr, Serializer, SerialError, Shared, TypeRegistry, polymorphic_base,
    register_type,
};

pub trait Member: Polymorphic {
    fn stiffness(&self) -> f64;
}
polymorphic_base!(dyn Member);

#[derive(Persist, Default)]
#[persist(tag = "Bar")]
struct Bar {
    area: f64,
    modulus: f64,
}

impl Member for Bar {
    fn stiffness(&self) -> f64 {
        self.area * self.modulus
    }
}

#[derive(Persist, Default)]
#[persist(tag = "Spring")]
struct Spring {
    k: f64,
}

impl Member for Spring {
    fn stiffness(&self) -> f64 {
        self.k
    }
}

register_type!(dyn Member => Bar, "Bar");
register_type!(dyn Member => Spring, "Spring");
register_type!(Spring, "Spring");

#[test]
fn global_registry_collects_submissions() {
    let registry = TypeRegistry::global();
    // Platforms without link-time collection leave the registry empty.
    if registry.is_empty() {
        return;
    }

    assert!(registry.contains::<dyn Member>("Bar"));
    assert!(registry.contains::<dyn Member>("Spring"));
    assert!(registry.contains::<Spring>("Spring"));
    assert_eq!(registry.tag_of::<Bar>(), Some("Bar"));
    assert_eq!(registry.bases_of("Spring").len(), 2);
}

#[test]
fn default_serializer_loads_polymorphic_members() {
    if TypeRegistry::global().is_empty() {
        return;
    }

    let bar: Shared<Bar> = Rc::new(RefCell::new(Bar {
        area: 2.0,
        modulus: 100.0,
    }));
    let members: Vec<Ptr<dyn Member>> = vec![
        Ptr::<dyn Member>::from_rc(bar.clone()),
        Ptr::<dyn Member>::from_rc(Rc::new(RefCell::new(Spring { k: 7.5 }))),
        Ptr::<dyn Member>::from_rc(bar),
    ];

    let mut s = Serializer::new();
    s.save("members", &members).unwrap();

    let mut back: Vec<Ptr<dyn Member>> = Vec::new();
    s.load("members", &mut back).unwrap();

    let stiffness: Vec<f64> = back
        .iter()
        .map(|member| member.borrow().unwrap().stiffness())
        .collect();
    assert_eq!(stiffness, [200.0, 7.5, 200.0]);
    assert!(back[0].ptr_eq(&back[2]));
    assert_eq!(back[1].borrow().unwrap().type_tag(), "Spring");
}

#[test]
fn local_registry_ignores_submissions() {
    let registry = TypeRegistry::new();
    let mut s = Serializer::builder().registry(&registry).build();

    let member: Ptr<dyn Member> = Ptr::from_rc(Rc::new(RefCell::new(Spring { k: 1.0 })));
    assert!(matches!(
        s.save("member", &member),
        Err(SerialError::UnknownType { tag, .. }) if tag == "Spring"
    ));
}
