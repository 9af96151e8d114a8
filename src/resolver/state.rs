use std::fmt;

use super::ResolveError;
use crate::dns::{DNSMessage, DNSResourceData, DNSResourceType};
use crate::ndn::{Component, Name, ndnify};

/// Marks where the zone name ends and the record owner begins.
pub const DNS_MARKER: &str = "DNS";

/// Separates a forwarding hint from the name it routes.
pub const FORWARDING_HINT_MARKER: &[u8] = b"\xF0.";

/// Record type the next response should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expecting {
    Delegation,
    ForwardingHint,
}

impl Expecting {
    fn record_type(&self) -> DNSResourceType {
        match self {
            Expecting::Delegation => DNSResourceType::NS,
            Expecting::ForwardingHint => DNSResourceType::FH,
        }
    }
}

impl fmt::Display for Expecting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.record_type())
    }
}

/// What a response's first answer turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerKind {
    Empty,
    Record(DNSResourceType),
}

impl AnswerKind {
    pub fn of(message: &DNSMessage) -> Self {
        match message.first_answer() {
            Some(record) => AnswerKind::Record(record.rtype),
            None => AnswerKind::Empty,
        }
    }
}

impl fmt::Display for AnswerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerKind::Empty => write!(f, "an empty answer section"),
            AnswerKind::Record(rtype) => write!(f, "a {} record", rtype),
        }
    }
}

/// What the engine should do after a verified response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Express this question next.
    Query(Name),
    /// The response just handled was the answer.
    Complete,
}

/// Progress of one iterative resolution.
///
/// `labels` is the queried name top-down with the record type as the last
/// label. `labels[..cursor]` have been resolved into `zone`; `hint` routes
/// questions toward the zone's authority.
#[derive(Debug, Clone)]
pub struct ResolutionState {
    labels: Vec<Component>,
    cursor: usize,
    zone: Name,
    hint: Name,
    expecting: Expecting,
    is_final: bool,
    strict: bool,
}

impl ResolutionState {
    /// `name` is either dotted (`www.ucla.edu`) or an NDN URI (`/edu/ucla/www`).
    pub fn new(name: &str, record_type: &str) -> Result<Self, ResolveError> {
        let rtype = record_type
            .parse::<DNSResourceType>()
            .map_err(|_| ResolveError::InvalidRecordType(record_type.to_string()))?;
        let owner = if name.starts_with('/') {
            Name::from_uri(name).map_err(|e| ResolveError::InvalidName(e.to_string()))?
        } else {
            ndnify(name)
        };
        if owner.is_empty() {
            return Err(ResolveError::InvalidName(format!("{:?} has no labels", name)));
        }

        let mut labels = owner.components().to_vec();
        labels.push(Component::from(rtype.to_string()));
        Ok(Self {
            labels,
            cursor: 0,
            zone: Name::new(),
            hint: Name::new(),
            expecting: Expecting::Delegation,
            is_final: false,
            strict: true,
        })
    }

    pub fn with_strict_delegation(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn labels(&self) -> &[Component] {
        &self.labels
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn zone(&self) -> &Name {
        &self.zone
    }

    pub fn hint(&self) -> &Name {
        &self.hint
    }

    pub fn expecting(&self) -> Expecting {
        self.expecting
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// The delegation question for the first label.
    pub fn first_question(&self) -> Name {
        self.delegation_question()
    }

    /// Apply a verified, decoded response and pick the next step.
    pub fn advance(&mut self, message: &DNSMessage) -> Result<Transition, ResolveError> {
        if self.is_final {
            return Ok(Transition::Complete);
        }

        let answer = message.first_answer().map(|record| &record.rdata);
        match (self.expecting, answer) {
            (Expecting::Delegation, Some(DNSResourceData::Delegation(_))) => {
                let target = message
                    .first_answer()
                    .and_then(|record| record.delegation_target())
                    .unwrap_or_default();
                let target_name = ndnify(&target);
                let in_zone = self.zone.is_prefix_of(&target_name);
                if self.strict && !in_zone {
                    return Err(ResolveError::DomainMismatch {
                        zone: self.zone.clone(),
                        target,
                    });
                }
                // Questions already carry the zone, keep only the labels below it
                let relative: Name = if in_zone {
                    target_name.components()[self.zone.len()..].iter().cloned().collect()
                } else {
                    target_name
                };
                self.expecting = Expecting::ForwardingHint;
                Ok(Transition::Query(
                    self.question(Some(&relative), Some(DNSResourceType::FH)),
                ))
            }
            (Expecting::Delegation, Some(DNSResourceData::Nonexistence)) => {
                self.is_final = true;
                Ok(Transition::Query(self.final_question()))
            }
            (Expecting::ForwardingHint, Some(DNSResourceData::ForwardingHint { hint, .. })) => {
                // The record type label can never become part of a zone
                if self.cursor + 1 >= self.labels.len() {
                    return Err(self.unexpected(message));
                }
                self.hint = hint.clone();
                self.zone.push(self.labels[self.cursor].clone());
                self.cursor += 1;
                self.expecting = Expecting::Delegation;
                Ok(Transition::Query(self.delegation_question()))
            }
            _ => Err(self.unexpected(message)),
        }
    }

    fn unexpected(&self, message: &DNSMessage) -> ResolveError {
        ResolveError::UnexpectedAnswer {
            expecting: self.expecting,
            found: AnswerKind::of(message),
        }
    }

    fn delegation_question(&self) -> Name {
        let label = label_name(&self.labels[self.cursor]);
        self.question(Some(&label), Some(DNSResourceType::NS))
    }

    /// `zone/DNS` followed by every unresolved label, record type last.
    fn final_question(&self) -> Name {
        let question = self.labels[self.cursor..]
            .iter()
            .fold(self.zone_root(), |name, label| name.append(label.clone()));
        self.route(question)
    }

    fn question(&self, label: Option<&Name>, rtype: Option<DNSResourceType>) -> Name {
        let mut question = self.zone_root();
        if let Some(label) = label {
            question = question.append_name(label);
        }
        if let Some(rtype) = rtype {
            question = question.append(rtype.to_string());
        }
        self.route(question)
    }

    fn zone_root(&self) -> Name {
        self.zone.clone().append(DNS_MARKER)
    }

    /// Prefix `question` with the forwarding hint unless the hint already
    /// covers it.
    fn route(&self, question: Name) -> Name {
        if self.hint.is_empty() || self.hint.is_prefix_of(&question) {
            return question;
        }
        self.hint
            .clone()
            .append(Component::new(FORWARDING_HINT_MARKER))
            .append_name(&question)
    }
}

/// A label as a name: dotted text is split and reversed like a DNS name.
fn label_name(label: &Component) -> Name {
    match label.as_str() {
        Some(text) if text.contains('.') => ndnify(text),
        _ => std::iter::once(label.clone()).collect(),
    }
}
