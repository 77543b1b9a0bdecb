// ==========================================
// 物流ERP资源调度系统 - 工作日历
// ==========================================
// 职责: 工作日判定、日期区间展开、工作日计数
// 红线: 无状态查询,不含业务规则
// 默认口径: 周六/周日为非工作日,节假日显式登记
// ==========================================

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ==========================================
// WorkCalendar - 工作日历
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkCalendar {
    holidays: HashSet<NaiveDate>,
    non_working_weekdays: HashSet<Weekday>,
}

impl Default for WorkCalendar {
    fn default() -> Self {
        Self {
            holidays: HashSet::new(),
            non_working_weekdays: HashSet::from([Weekday::Sat, Weekday::Sun]),
        }
    }
}

impl WorkCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// 按自定义周末口径构造日历
    ///
    /// # 参数
    /// - weekend_weekdays: 非工作的星期集合(chrono 编号, Mon=0..Sun=6)
    ///
    /// # 说明
    /// 空集合或全集等非法口径回退到默认周六/周日
    pub fn with_weekend_days(weekend_weekdays: &[u32]) -> Self {
        let mut non_working = HashSet::new();
        for day in Self::ALL_WEEKDAYS {
            if weekend_weekdays.contains(&day.num_days_from_monday()) {
                non_working.insert(day);
            }
        }

        if non_working.len() >= Self::ALL_WEEKDAYS.len() {
            return Self::default();
        }

        Self {
            holidays: HashSet::new(),
            non_working_weekdays: non_working,
        }
    }

    /// 登记单个节假日
    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }

    /// 批量登记节假日
    pub fn add_holidays(&mut self, dates: &[NaiveDate]) {
        self.holidays.extend(dates);
    }

    /// 判断是否为工作日
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        !self.holidays.contains(&date) && !self.non_working_weekdays.contains(&date.weekday())
    }

    /// 展开闭区间为逐日列表(含两端,按日期升序)
    ///
    /// start > end 时返回空列表
    pub fn expand_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut current = start;
        while current <= end {
            dates.push(current);
            current += Duration::days(1);
        }
        dates
    }

    /// 统计闭区间内的工作日天数
    pub fn working_days_in_range(&self, start: NaiveDate, end: NaiveDate) -> i64 {
        let mut count = 0;
        let mut current = start;
        while current <= end {
            if self.is_working_day(current) {
                count += 1;
            }
            current += Duration::days(1);
        }
        count
    }

}
