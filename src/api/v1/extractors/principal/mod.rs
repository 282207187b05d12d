/*!
 * Principal extractor
 *
 * Responsibility:
 * - middleware が解決した Principal を handler に渡す
 * - handler は Principal.id を行単位の所有者キーとして使う
 */

mod core;

pub use self::core::CurrentPrincipal;
