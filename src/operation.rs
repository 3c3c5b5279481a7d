/// A replayable mutation of the underlying container `C`.
///
/// Implementors are expected to be closed tagged variants (an `enum` listing
/// every mutation a [`Writer`](crate::Writer) can perform), not an open
/// trait-object hierarchy: the op-log only ever replays operations the writer
/// already owns, so there is nothing to gain from letting third parties
/// inject new variants into somebody else's log. See [`crate::map::MapOp`]
/// for the canonical example.
///
/// `apply` takes `&self` rather than `self` on purpose. Every write is
/// applied twice over the lifetime of a single op-log entry: once against the
/// write-side copy at [`Writer::write`](crate::Writer::write) time (whose
/// result is handed back to the caller), and once more against the retired
/// copy during [`Writer::refresh`](crate::Writer::refresh). Taking `&self`
/// lets the writer hold on to the same value for both applications instead of
/// cloning it or threading a second copy through the log.
///
/// Implementations must be deterministic: given two containers that are
/// structurally equal, applying the same operation to both must leave them
/// structurally equal. They must not retain a reference to `c` past the call,
/// and must not mutate anything outside of `c`. Violating either of these
/// causes the read-side and write-side copies to drift apart, which this
/// crate has no way to detect.
pub trait Operation<C> {
    /// The value produced by applying this operation, e.g. the previous
    /// value of a key for a map `put`.
    type Output;

    /// Mutate `container` and return the result of having done so.
    fn apply(&self, container: &mut C) -> Self::Output;
}
