use std::time::Duration;

use cellar_proto::v2 as pb;

/// Row and cell accounting for one read: comparing seen counts to returned
/// counts indicates how much work the configured filter discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadIterationStats {
    pub cells_returned_count: i64,
    pub cells_seen_count: i64,
    pub rows_returned_count: i64,
    pub rows_seen_count: i64,
}

/// Server-side latency measurements for one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestLatencyStats {
    /// Time from the frontend server receiving the request to it emitting
    /// this measurement.
    pub frontend_server_latency: Duration,
}

/// Everything the server reports about a read when the full stats view was
/// requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FullReadStats {
    pub read_iteration_stats: ReadIterationStats,
    pub request_latency_stats: RequestLatencyStats,
}

impl FullReadStats {
    /// Builds the view from wire stats. Assumes `REQUEST_STATS_FULL` was
    /// requested, which is the only view the client asks for.
    pub fn from_proto(stats: &pb::RequestStats) -> FullReadStats {
        let Some(pb::request_stats::StatsView::FullReadStatsView(view)) = &stats.stats_view
        else {
            return FullReadStats::default();
        };

        let iteration = view.read_iteration_stats.as_ref();
        let latency = view
            .request_latency_stats
            .as_ref()
            .and_then(|l| l.frontend_server_latency.as_ref());

        FullReadStats {
            read_iteration_stats: iteration
                .map(|s| ReadIterationStats {
                    cells_returned_count: s.cells_returned_count,
                    cells_seen_count: s.cells_seen_count,
                    rows_returned_count: s.rows_returned_count,
                    rows_seen_count: s.rows_seen_count,
                })
                .unwrap_or_default(),
            request_latency_stats: RequestLatencyStats {
                frontend_server_latency: latency.map(duration_from_proto).unwrap_or_default(),
            },
        }
    }
}

fn duration_from_proto(d: &prost_types::Duration) -> Duration {
    if d.seconds < 0 || d.nanos < 0 {
        return Duration::ZERO;
    }
    Duration::new(d.seconds as u64, d.nanos as u32)
}
