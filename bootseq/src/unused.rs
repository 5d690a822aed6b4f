//! Detection of required properties that nothing consumed.

use std::collections::BTreeSet;

use crate::{Message, PropertyMap};

/// Reports one error per key of `required` that is neither in `used` nor in
/// `exempt`, in lexicographic order.
///
/// Only the required source is checked: optional overrides and system
/// properties may legitimately carry keys no schema reads. `exempt` holds
/// keys that already failed earlier in the pass.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use bootseq::{PropertyMap, unused_properties};
///
/// let mut required = PropertyMap::new();
/// required.insert("service.name".into(), "x".into());
/// required.insert("typo.setting".into(), "y".into());
/// let used = BTreeSet::from(["service.name".to_owned()]);
/// let errors = unused_properties(&required, &BTreeSet::new(), &used);
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors[0].text(), "Configuration property 'typo.setting' was not used");
/// ```
#[must_use]
pub fn unused_properties(
    required: &PropertyMap,
    exempt: &BTreeSet<String>,
    used: &BTreeSet<String>,
) -> Vec<Message> {
    required
        .keys()
        .filter(|key| !used.contains(*key) && !exempt.contains(*key))
        .map(|key| Message::error(format!("Configuration property '{key}' was not used")))
        .collect()
}
