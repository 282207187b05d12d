/*
 * Responsibility
 * - handler から呼ばれる業務ロジック層 (認可など)
 */
pub mod auth;
