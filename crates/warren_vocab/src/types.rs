/*
 * SPDX-FileCopyrightText: 2026 The Warren Project
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! ActivityStreams type-token sets used to recover concrete variants from
//! the `type` property of a JSON-LD payload.

/// The special public addressing collection.
pub const PUBLIC_NS: &str = "https://www.w3.org/ns/activitystreams#Public";

pub const ACTOR_TYPES: &[&str] = &["Application", "Group", "Organization", "Person", "Service"];

pub const LINK_TYPES: &[&str] = &["Link", "Mention"];

pub const COLLECTION_TYPES: &[&str] = &[
    "Collection",
    "CollectionPage",
    "OrderedCollection",
    "OrderedCollectionPage",
];

pub const ORDERED_COLLECTION_TYPES: &[&str] = &["OrderedCollection", "OrderedCollectionPage"];

/// Activity types that carry no `object` property.
pub const INTRANSITIVE_ACTIVITY_TYPES: &[&str] = &["Arrive", "Travel", "Question"];

pub const ACTIVITY_TYPES: &[&str] = &[
    "Accept",
    "Add",
    "Announce",
    "Block",
    "Create",
    "Delete",
    "Dislike",
    "Flag",
    "Follow",
    "Ignore",
    "Invite",
    "Join",
    "Leave",
    "Like",
    "Listen",
    "Move",
    "Offer",
    "Read",
    "Reject",
    "Remove",
    "TentativeAccept",
    "TentativeReject",
    "Undo",
    "Update",
    "View",
];

pub fn is_actor_type(t: &str) -> bool {
    ACTOR_TYPES.contains(&t)
}

pub fn is_link_type(t: &str) -> bool {
    LINK_TYPES.contains(&t)
}

pub fn is_collection_type(t: &str) -> bool {
    COLLECTION_TYPES.contains(&t)
}

pub fn is_ordered_collection_type(t: &str) -> bool {
    ORDERED_COLLECTION_TYPES.contains(&t)
}

pub fn is_activity_type(t: &str) -> bool {
    ACTIVITY_TYPES.contains(&t) || is_intransitive_activity_type(t)
}

pub fn is_intransitive_activity_type(t: &str) -> bool {
    INTRANSITIVE_ACTIVITY_TYPES.contains(&t)
}
