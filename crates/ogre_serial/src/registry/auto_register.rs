use crate::registry::TypeRegistry;

/// One [`register_type!`](crate::register_type) submission.
pub struct AutoRegistration {
    // `None` only for the crate's own marker submission.
    register: Option<fn(&mut TypeRegistry)>,
}

impl AutoRegistration {
    #[inline]
    pub const fn new(register: fn(&mut TypeRegistry)) -> Self {
        Self {
            register: Some(register),
        }
    }
}

inventory::collect!(AutoRegistration);

// Seeing this submission proves that the platform collects them at all.
inventory::submit! {
    AutoRegistration { register: None }
}

/// Applies every submission, returning whether collection is supported.
pub(super) fn register_all(registry: &mut TypeRegistry) -> bool {
    let mut available = false;
    let mut applied = 0_usize;
    for registration in inventory::iter::<AutoRegistration> {
        match registration.register {
            Some(register) => {
                register(registry);
                applied += 1;
            }
            None => available = true,
        }
    }
    if available {
        log::debug!("applied {applied} static type registrations");
    } else {
        log::debug!("static type registration is not supported on this platform");
    }
    available
}
