use std::collections::HashMap;

use crate::types::Person;

/// Orders people by category, then by id, matching how the roster is
/// listed upstream before interleaving.
pub fn sort_for_seating(people: &mut [Person]) {
    people.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.id.cmp(&b.id)));
}

/// Round-robins people across categories so that contiguous slices of the
/// result mix categories instead of carrying one category's whole block.
///
/// Groups keep first-seen order and people keep their order within a group.
pub fn interleave(people: &[Person]) -> Vec<Person> {
    let mut groups: Vec<Vec<&Person>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for person in people {
        let g = *index.entry(person.category.as_str()).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[g].push(person);
    }

    let rounds = groups.iter().map(Vec::len).max().unwrap_or(0);
    let mut out = Vec::with_capacity(people.len());
    for round in 0..rounds {
        for group in &groups {
            if let Some(&person) = group.get(round) {
                out.push(person.clone());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(people: &[Person]) -> Vec<&str> {
        people.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_round_robin_across_groups() {
        let people = vec![
            Person::new("a1", "", "A"),
            Person::new("a2", "", "A"),
            Person::new("a3", "", "A"),
            Person::new("b1", "", "B"),
            Person::new("c1", "", "C"),
            Person::new("c2", "", "C"),
        ];
        let out = interleave(&people);
        assert_eq!(ids(&out), vec!["a1", "b1", "c1", "a2", "c2", "a3"]);
    }

    #[test]
    fn test_unsorted_input_keeps_first_seen_group_order() {
        let people = vec![
            Person::new("b1", "", "B"),
            Person::new("a1", "", "A"),
            Person::new("b2", "", "B"),
            Person::new("n1", "", ""),
        ];
        let out = interleave(&people);
        assert_eq!(ids(&out), vec!["b1", "a1", "n1", "b2"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(interleave(&[]).is_empty());
    }

    #[test]
    fn test_sort_for_seating() {
        let mut people = vec![
            Person::new("2", "", "EE"),
            Person::new("9", "", "CS"),
            Person::new("1", "", "EE"),
            Person::new("3", "", "CS"),
        ];
        sort_for_seating(&mut people);
        assert_eq!(ids(&people), vec!["3", "9", "1", "2"]);
    }
}
