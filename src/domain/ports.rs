use crate::domain::model::{
    Course, CourseId, Differential, Match, MatchDay, MatchDayId, MatchDayStatus, MatchId,
    PlayerHandicap, PlayerId, ScoreSubmission, SeasonId,
};
use crate::utils::error::Result;

/// 一個賽季範圍內的交易視圖：所有讀寫都在同一個交易裡完成
pub trait SeasonTx {
    fn season_id(&self) -> &SeasonId;

    fn match_day(&self, id: &MatchDayId) -> Result<MatchDay>;
    /// 本賽季所有比賽日
    fn match_days(&self) -> Result<Vec<MatchDay>>;
    fn matches_for_day(&self, id: &MatchDayId) -> Result<Vec<Match>>;
    fn course(&self, id: &CourseId) -> Result<Course>;
    fn player(&self, id: &PlayerId) -> Result<PlayerHandicap>;
    fn differentials(&self, player: &PlayerId) -> Result<Vec<Differential>>;
    fn round(&self, match_id: &MatchId, player: &PlayerId) -> Result<Option<ScoreSubmission>>;

    /// 以 (match, player) 為鍵覆寫
    fn save_round(&mut self, round: ScoreSubmission) -> Result<()>;
    /// 以 (player, match) 為鍵覆寫
    fn save_differential(&mut self, player: &PlayerId, differential: Differential) -> Result<()>;
    fn remove_differential(&mut self, player: &PlayerId, match_id: &MatchId) -> Result<()>;
    fn set_handicap_index(&mut self, player: &PlayerId, index: f64) -> Result<()>;
    fn save_match(&mut self, record: Match) -> Result<()>;
    fn set_match_day_status(&mut self, id: &MatchDayId, status: MatchDayStatus) -> Result<()>;
}

/// 持久層協作者。`in_transaction` 在 `work` 回傳 `Err` 時不得留下任何寫入。
pub trait LeagueStore {
    fn season_of(&self, match_day: &MatchDayId) -> Result<SeasonId>;

    fn in_transaction<T, F>(&self, season: &SeasonId, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn SeasonTx) -> Result<T>;
}
